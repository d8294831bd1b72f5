//! Rendering of ledger [`Error`]s as Actix responses.
//!
//! Internal failures are logged in full and replaced by a generic body; all
//! other codes pass through with their message and details intact.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Handler result carrying a ledger [`Error`].
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest | ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::CooldownActive => StatusCode::CONFLICT,
            ErrorCode::DailyCapExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(trace_id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, trace_id));
        }

        if self.code() != ErrorCode::InternalError {
            return response.json(self);
        }

        error!(trace_id = ?self.trace_id(), detail = self.message(), "ledger request failed");
        let public = self
            .trace_id()
            .map_or_else(
                || Error::internal(REDACTED_MESSAGE),
                |trace_id| Error::internal(REDACTED_MESSAGE).with_trace_id(trace_id),
            );
        response.json(public)
    }
}

/// Extractor and payload errors surface as redacted internal failures.
impl From<actix_web::Error> for Error {
    fn from(source: actix_web::Error) -> Self {
        error!(error = %source, "unexpected actix error in ledger handler");
        Self::internal(REDACTED_MESSAGE)
    }
}
