//! Page envelope and limit validation.

use serde::Serialize;
use url::Url;

/// Errors raised while validating a requested page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageLimitError {
    /// The requested limit is zero.
    #[error("limit must be at least 1")]
    Zero,
    /// The requested limit exceeds the endpoint maximum.
    #[error("limit must not exceed {max}")]
    TooLarge {
        /// Maximum accepted limit.
        max: u32,
    },
}

/// Validated page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Validate `requested`, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PageLimitError`] when the effective limit is zero or greater
    /// than `max`.
    pub const fn new(requested: Option<u32>, default: u32, max: u32) -> Result<Self, PageLimitError> {
        let value = match requested {
            Some(value) => value,
            None => default,
        };
        if value == 0 {
            return Err(PageLimitError::Zero);
        }
        if value > max {
            return Err(PageLimitError::TooLarge { max });
        }
        Ok(Self(value))
    }

    /// Return the limit value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Navigation links for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the next page when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links from the request URL, rewriting the `limit` and `cursor`
    /// query parameters while preserving any others.
    pub fn from_request(request_url: &Url, limit: PageLimit, next_cursor: Option<&str>) -> Self {
        let next = next_cursor.map(|cursor| with_page_params(request_url, limit, Some(cursor)));
        Self {
            self_: request_url.to_string(),
            next,
        }
    }
}

fn with_page_params(base: &Url, limit: PageLimit, cursor: Option<&str>) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "limit" && key != "cursor")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("limit", &limit.get().to_string());
        if let Some(cursor) = cursor {
            pairs.append_pair("cursor", cursor);
        }
    }
    url.to_string()
}

/// Cursor-paginated response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Page size used to produce this page.
    pub limit: u32,
    /// Opaque cursor for the next page, absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Navigation links.
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// Assemble an envelope from page data.
    pub fn new(data: Vec<T>, limit: PageLimit, next_cursor: Option<String>, request_url: &Url) -> Self {
        let links = PaginationLinks::from_request(request_url, limit, next_cursor.as_deref());
        Self {
            data,
            limit: limit.get(),
            next_cursor,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Envelope and limit behaviour.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, Ok(100))]
    #[case(Some(1), Ok(1))]
    #[case(Some(1000), Ok(1000))]
    #[case(Some(0), Err(PageLimitError::Zero))]
    #[case(Some(1001), Err(PageLimitError::TooLarge { max: 1000 }))]
    fn limits_are_bounded(#[case] requested: Option<u32>, #[case] expected: Result<u32, PageLimitError>) {
        assert_eq!(PageLimit::new(requested, 100, 1000).map(PageLimit::get), expected);
    }

    #[rstest]
    fn next_link_replaces_page_params_and_keeps_others() {
        let Ok(url) = Url::parse("http://localhost/api/v1/seed/ledger/pages?limit=5&cursor=old&x=1") else {
            panic!("fixture url parses");
        };
        let Ok(limit) = PageLimit::new(Some(5), 100, 1000) else {
            panic!("fixture limit is valid");
        };
        let links = PaginationLinks::from_request(&url, limit, Some("abc"));

        assert_eq!(links.self_, url.to_string());
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost/api/v1/seed/ledger/pages?x=1&limit=5&cursor=abc")
        );
    }

    #[rstest]
    fn last_page_has_no_next_link() {
        let Ok(url) = Url::parse("http://localhost/items") else {
            panic!("fixture url parses");
        };
        let Ok(limit) = PageLimit::new(None, 10, 10) else {
            panic!("fixture limit is valid");
        };
        let page = Paginated::new(vec![1, 2], limit, None, &url);

        assert!(page.links.next.is_none());
        assert_eq!(page.limit, 10);
        assert_eq!(page.data, vec![1, 2]);
    }
}
