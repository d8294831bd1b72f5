//! PostgreSQL persistence adapters using Diesel.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay private
//! to this module; adapters translate them into domain types. Connections
//! come from a `bb8` pool driven by `diesel-async`.
//!
//! # Example
//!
//! ```ignore
//! use seed_ledger::outbound::persistence::{DbPool, DieselSeedLedgerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/seed")).await?;
//! let repo = DieselSeedLedgerRepository::new(pool);
//! ```

mod diesel_helpers;
mod diesel_seed_ledger_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_seed_ledger_repository::DieselSeedLedgerRepository;
pub use migrations::{MIGRATIONS, MigrationError, apply_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
