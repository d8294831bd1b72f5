//! Driven port for the append-only SEED event store.
//!
//! Adapters never update or delete events. Listing methods order events by
//! `(created_at, id)`; "newest first" means descending on both.

use async_trait::async_trait;

use crate::domain::{
    AppendOutcome, EventType, GuardedAppend, Identity, LedgerPosition, SeedEvent, UtcDayWindow,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by SEED ledger repository adapters.
    pub enum SeedLedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "seed ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "seed ledger repository query failed: {message}",
    }
}

/// Offset window over a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPage {
    pub limit: u32,
    pub offset: u64,
}

/// Port for reading and appending ledger events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeedLedgerRepository: Send + Sync {
    /// Sum of all deltas for `identity`; zero when it has no events.
    async fn balance(&self, identity: &Identity) -> Result<i64, SeedLedgerRepositoryError>;

    /// Sum of positive deltas for `identity` inside `window`.
    async fn positive_total_between(
        &self,
        identity: &Identity,
        window: &UtcDayWindow,
    ) -> Result<i64, SeedLedgerRepositoryError>;

    /// Whether `identity` has an event of `event_type` inside `window`.
    async fn has_event_between(
        &self,
        identity: &Identity,
        event_type: &EventType,
        window: &UtcDayWindow,
    ) -> Result<bool, SeedLedgerRepositoryError>;

    /// Newest-first events for `identity`.
    async fn list_for_identity(
        &self,
        identity: &Identity,
        page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError>;

    /// Newest-first events for `identity` strictly older than `after`.
    ///
    /// `None` starts from the newest event.
    async fn list_after_position(
        &self,
        identity: &Identity,
        after: Option<LedgerPosition>,
        limit: u32,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError>;

    /// Sum of deltas for events at or before `position`.
    async fn balance_through(
        &self,
        identity: &Identity,
        position: LedgerPosition,
    ) -> Result<i64, SeedLedgerRepositoryError>;

    /// Newest-first events across every identity.
    async fn list_all(&self, page: LedgerPage)
    -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError>;

    /// Complete oldest-first history for `identity`.
    async fn export_for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError>;

    /// Complete oldest-first history across every identity.
    async fn export_all(&self) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError>;

    /// Read [`crate::domain::GuardFacts`] and append when the guard allows it.
    ///
    /// Reads and the insert must be atomic with respect to other appends for
    /// the same identity.
    async fn append_guarded(
        &self,
        request: GuardedAppend,
    ) -> Result<AppendOutcome, SeedLedgerRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
///
/// Reports an empty ledger and skips every append.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSeedLedgerRepository;

#[async_trait]
impl SeedLedgerRepository for FixtureSeedLedgerRepository {
    async fn balance(&self, _identity: &Identity) -> Result<i64, SeedLedgerRepositoryError> {
        Ok(0)
    }

    async fn positive_total_between(
        &self,
        _identity: &Identity,
        _window: &UtcDayWindow,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        Ok(0)
    }

    async fn has_event_between(
        &self,
        _identity: &Identity,
        _event_type: &EventType,
        _window: &UtcDayWindow,
    ) -> Result<bool, SeedLedgerRepositoryError> {
        Ok(false)
    }

    async fn list_for_identity(
        &self,
        _identity: &Identity,
        _page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_after_position(
        &self,
        _identity: &Identity,
        _after: Option<LedgerPosition>,
        _limit: u32,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn balance_through(
        &self,
        _identity: &Identity,
        _position: LedgerPosition,
    ) -> Result<i64, SeedLedgerRepositoryError> {
        Ok(0)
    }

    async fn list_all(
        &self,
        _page: LedgerPage,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn export_for_identity(
        &self,
        _identity: &Identity,
    ) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn export_all(&self) -> Result<Vec<SeedEvent>, SeedLedgerRepositoryError> {
        Ok(Vec::new())
    }

    async fn append_guarded(
        &self,
        _request: GuardedAppend,
    ) -> Result<AppendOutcome, SeedLedgerRepositoryError> {
        Ok(AppendOutcome::Skipped { balance: 0 })
    }
}
