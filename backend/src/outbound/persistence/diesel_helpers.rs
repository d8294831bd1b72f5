//! Translation of pool and Diesel failures into repository errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::SeedLedgerRepositoryError;

use super::pool::PoolError;

/// Pool failures always mean the store is unreachable.
pub(super) fn from_pool(error: &PoolError) -> SeedLedgerRepositoryError {
    SeedLedgerRepositoryError::connection(error.cause())
}

/// Dropped connections are connection errors; everything else is a query
/// error.
pub(super) fn from_diesel(error: &DieselError) -> SeedLedgerRepositoryError {
    debug!(%error, "seed ledger statement failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            SeedLedgerRepositoryError::connection(error.to_string())
        }
        _ => SeedLedgerRepositoryError::query(error.to_string()),
    }
}

/// Widen a page bound to the `BIGINT` used by `LIMIT` and `OFFSET`.
pub(super) fn bigint<T: TryInto<i64>>(
    value: T,
    name: &str,
) -> Result<i64, SeedLedgerRepositoryError> {
    value
        .try_into()
        .map_err(|_| SeedLedgerRepositoryError::query(format!("{name} exceeds i64 range")))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::closed(
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(String::from("server closed the connection")),
        ),
        true
    )]
    #[case::broken_transaction(DieselError::BrokenTransactionManager, true)]
    #[case::check_violation(
        DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new(String::from("seed_events_delta_non_zero")),
        ),
        false
    )]
    #[case::not_found(DieselError::NotFound, false)]
    fn lost_connections_are_told_apart(#[case] error: DieselError, #[case] connection: bool) {
        let mapped = from_diesel(&error);
        assert_eq!(
            matches!(mapped, SeedLedgerRepositoryError::Connection { .. }),
            connection
        );
    }

    #[rstest]
    fn pool_failures_keep_only_the_cause() {
        assert_eq!(
            from_pool(&PoolError::Checkout("timed out".to_owned())),
            SeedLedgerRepositoryError::connection("timed out")
        );
    }

    #[rstest]
    fn bigint_rejects_values_past_i64() {
        assert_eq!(bigint(5_u32, "limit"), Ok(5));
        assert_eq!(
            bigint(u64::MAX, "offset"),
            Err(SeedLedgerRepositoryError::query("offset exceeds i64 range"))
        );
    }
}
