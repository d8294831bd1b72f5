//! Caller identity supplied by the fronting gateway.
//!
//! The ledger performs no authentication. A trusted proxy forwards either a
//! verified email or an `anon:` token in [`IDENTITY_HEADER`]; the service
//! decides which operations need an account.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, Identity, IdentityValidationError};

/// Header carrying the caller identity.
pub const IDENTITY_HEADER: &str = "X-User-Email";

/// Identity extracted from the request, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity(Option<Identity>);

impl RequestIdentity {
    pub fn new(identity: Option<Identity>) -> Self {
        Self(identity)
    }

    /// Identity if one was supplied.
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<Identity> {
        self.0
    }

    /// Require an identity or return `401 Unauthorized`.
    pub fn require(self) -> Result<Identity, Error> {
        self.0.ok_or_else(|| Error::auth_required("Login required"))
    }
}

fn parse_header(req: &HttpRequest) -> Result<Option<Identity>, Error> {
    let Some(value) = req.headers().get(IDENTITY_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        Error::invalid_request("identity header must be visible ASCII")
            .with_details(json!({ "header": IDENTITY_HEADER, "code": "invalid_identity" }))
    })?;
    match Identity::new(raw) {
        Ok(identity) => Ok(Some(identity)),
        Err(IdentityValidationError::Empty) => {
            debug!("blank identity header treated as absent");
            Ok(None)
        }
        Err(error @ IdentityValidationError::TooLong { .. }) => Err(Error::invalid_request(
            error.to_string(),
        )
        .with_details(json!({ "header": IDENTITY_HEADER, "code": "invalid_identity" }))),
    }
}

impl FromRequest for RequestIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_header(req).map(RequestIdentity::new))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, ResponseError, test as actix_test, web};
    use rstest::rstest;

    use super::*;
    use crate::domain::{ErrorCode, IDENTITY_MAX};

    async fn echo(identity: RequestIdentity) -> Result<HttpResponse, Error> {
        let identity = identity.require()?;
        Ok(HttpResponse::Ok().body(identity.to_string()))
    }

    #[rstest]
    #[case(Some(" user@x.com "), StatusCode::OK)]
    #[case(Some("anon:abc"), StatusCode::OK)]
    #[case(Some("   "), StatusCode::UNAUTHORIZED)]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn require_maps_missing_identity_to_unauthorized(
        #[case] header: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(App::new().route("/echo", web::get().to(echo))).await;
        let mut request = actix_test::TestRequest::get().uri("/echo");
        if let Some(value) = header {
            request = request.insert_header((IDENTITY_HEADER, value));
        }

        let response = actix_test::call_service(&app, request.to_request()).await;

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn identity_is_trimmed() {
        let app = actix_test::init_service(App::new().route("/echo", web::get().to(echo))).await;
        let request = actix_test::TestRequest::get()
            .uri("/echo")
            .insert_header((IDENTITY_HEADER, " user@x.com "))
            .to_request();

        let body = actix_test::call_and_read_body(&app, request).await;

        assert_eq!(body.as_ref(), b"user@x.com");
    }

    #[rstest]
    fn overlong_identity_is_rejected() {
        let request = actix_test::TestRequest::default()
            .insert_header((IDENTITY_HEADER, "a".repeat(IDENTITY_MAX + 1)))
            .to_http_request();

        let error = parse_header(&request).expect_err("overlong identity");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    fn absent_identity_is_none() {
        let request = actix_test::TestRequest::default().to_http_request();
        assert_eq!(parse_header(&request).expect("parsed"), None);
    }
}
