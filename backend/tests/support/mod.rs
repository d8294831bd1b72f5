//! Shared helper utilities for ledger integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! each suite pulls this module in with `mod support;` and uses only what it
//! needs.
#![allow(dead_code, reason = "each test crate uses a subset of the helpers")]

mod embedded_postgres;
pub mod pg_embed;

pub use embedded_postgres::{execute_raw, fresh_database};

/// Decide what a suite does when the embedded cluster fails to start.
///
/// Returns `None` (the suite skips) only when `SKIP_TEST_CLUSTER` is truthy;
/// otherwise the failure is fatal.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    let skip = std::env::var("SKIP_TEST_CLUSTER")
        .is_ok_and(|flag| ["1", "true", "yes"].contains(&flag.trim().to_ascii_lowercase().as_str()));
    assert!(
        skip,
        "embedded PostgreSQL unavailable: {reason} (set SKIP_TEST_CLUSTER=1 to skip)"
    );
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

/// Render a `postgres` error with SQLSTATE, detail and hint.
///
/// The plain `Display` of a server error is just `db error`, which hides
/// messages such as the append-only trigger's.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    error.as_db_error().map_or_else(
        || error.to_string(),
        |db| {
            let mut parts = vec![format!("{} [{}]", db.message(), db.code().code())];
            parts.extend(db.detail().map(|detail| format!("detail: {detail}")));
            parts.extend(db.hint().map(|hint| format!("hint: {hint}")));
            parts.join("; ")
        },
    )
}
