//! Prometheus-backed implementations of domain metrics ports.
//!
//! Feature-gated behind `metrics`.

mod prometheus_seed_ledger;

pub use prometheus_seed_ledger::PrometheusSeedLedgerMetrics;
