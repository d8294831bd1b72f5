//! Transport-neutral failure payload for ledger operations.
//!
//! Services return [`Error`]; inbound adapters decide how each
//! [`ErrorCode`] is rendered on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::trace_id::TraceId;

/// Failure category shared by every adapter.
///
/// Serialised in snake_case, e.g. `daily_cap_exceeded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input failed parsing or validation.
    InvalidRequest,
    /// No account identity was presented where one is needed.
    AuthRequired,
    /// Click reference outside the allow-list.
    InvalidReference,
    /// Today's positive deltas already reached the cap.
    DailyCapExceeded,
    /// Same reference earned inside the cooldown window.
    CooldownActive,
    /// Spend larger than the balance.
    InsufficientBalance,
    NotFound,
    /// Storage could not be reached.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// True for failures the caller can fix by changing the request.
    #[must_use]
    pub const fn is_client_fault(self) -> bool {
        !matches!(self, Self::ServiceUnavailable | Self::InternalError)
    }
}

/// Error body returned by ledger services.
///
/// The trace identifier of the enclosing request is captured on creation.
///
/// ```
/// use seed_ledger::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::CooldownActive, "try later");
/// assert_eq!((err.code(), err.message()), (ErrorCode::CooldownActive, "try later"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Error {
    #[schema(example = "daily_cap_exceeded")]
    code: ErrorCode,
    #[schema(example = "Daily SEED cap reached")]
    message: String,
    /// Request correlation identifier.
    #[serde(default, alias = "trace_id", skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    /// Machine-readable context, e.g. the cap that was hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

macro_rules! shorthand {
    ($($(#[$doc:meta])* $name:ident => $code:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )+
    };
}

impl Error {
    /// Build an error in the current trace scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().as_ref().map(ToString::to_string),
            details: None,
        }
    }

    shorthand! {
        /// [`ErrorCode::InvalidRequest`] with `message`.
        invalid_request => InvalidRequest;
        /// [`ErrorCode::AuthRequired`] with `message`.
        auth_required => AuthRequired;
        /// [`ErrorCode::NotFound`] with `message`.
        not_found => NotFound;
        /// [`ErrorCode::ServiceUnavailable`] with `message`.
        service_unavailable => ServiceUnavailable;
        /// [`ErrorCode::InternalError`] with `message`.
        internal => InternalError;
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Replace the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(id.into()),
            ..self
        }
    }

    /// Attach machine-readable context.
    ///
    /// ```
    /// use seed_ledger::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad limit").with_details(json!({ "field": "limit" }));
    /// assert_eq!(err.details(), Some(&json!({ "field": "limit" })));
    /// ```
    #[must_use]
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
