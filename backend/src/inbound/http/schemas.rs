//! OpenAPI schema definitions for types owned by other crates.
//!
//! The `pagination` crate stays free of `utoipa`; these wrappers mirror its
//! envelope so the generated document describes `/seed/ledger/pages`.

use utoipa::ToSchema;

use crate::inbound::http::seed_dto::LedgerEntryBody;

/// OpenAPI schema for [`pagination::PaginationLinks`].
#[derive(ToSchema)]
#[schema(as = pagination::PaginationLinks)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationLinksSchema {
    /// Link to the current page.
    #[schema(rename = "self", example = "/api/v1/seed/ledger/pages?limit=100")]
    self_: String,
    /// Link to the next page when one exists.
    next: Option<String>,
}

/// OpenAPI schema for a cursor page of ledger entries.
#[derive(ToSchema)]
#[schema(as = seed::LedgerPage)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LedgerPageSchema {
    /// Newest-first entries on this page.
    data: Vec<LedgerEntryBody>,
    /// Page size used to produce this page.
    #[schema(example = 100)]
    limit: u32,
    /// Opaque cursor for the next page, absent on the last page.
    #[schema(rename = "nextCursor")]
    next_cursor: Option<String>,
    links: PaginationLinksSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn ledger_page_schema_uses_camel_case_cursor() {
        let schema_json = schema_to_json::<LedgerPageSchema>();
        assert!(schema_json.contains("nextCursor"), "missing nextCursor");
        assert!(schema_json.contains("data"), "missing data");
    }

    #[test]
    fn links_schema_names_self_field() {
        let schema_json = schema_to_json::<PaginationLinksSchema>();
        assert!(schema_json.contains("\"self\""), "missing self link");
    }
}
