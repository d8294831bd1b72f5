//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed ledger entities used by the API and
//! persistence layers. Adapters depend on this module; it never depends on
//! them.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Identity: opaque actor key, either an account or an anonymous session.
//! - SeedLedgerService: command and query ports over a ledger repository.

pub mod error;
pub mod ports;

mod identity;
mod ledger;
mod seed_ledger_service;
mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::identity::{
    ANONYMOUS_PREFIX, IDENTITY_MAX, Identity, IdentityKind, IdentityValidationError,
};
pub use self::ledger::*;
pub use self::seed_ledger_service::SeedLedgerService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

