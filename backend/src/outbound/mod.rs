//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL ledger via Diesel
//! - **memory**: process-local ledger for database-less runs
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between domain types and infrastructure
//! representations; policy decisions stay in the domain.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
