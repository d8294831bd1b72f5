//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` so they only depend
//! on the ledger's driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureSeedLedgerCommand, FixtureSeedLedgerQuery, SeedLedgerCommand, SeedLedgerQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub seed_ledger: Arc<dyn SeedLedgerCommand>,
    pub seed_ledger_query: Arc<dyn SeedLedgerQuery>,
}

impl HttpState {
    /// Bundle the ledger's command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use seed_ledger::domain::ports::{FixtureSeedLedgerCommand, FixtureSeedLedgerQuery};
    /// use seed_ledger::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureSeedLedgerCommand),
    ///     Arc::new(FixtureSeedLedgerQuery),
    /// );
    /// let _cloned = state.clone();
    /// ```
    pub fn new(
        seed_ledger: Arc<dyn SeedLedgerCommand>,
        seed_ledger_query: Arc<dyn SeedLedgerQuery>,
    ) -> Self {
        Self {
            seed_ledger,
            seed_ledger_query,
        }
    }

    /// Build state from a single service implementing both ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: SeedLedgerCommand + SeedLedgerQuery + 'static,
    {
        Self::new(service.clone(), service)
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureSeedLedgerCommand),
            Arc::new(FixtureSeedLedgerQuery),
        )
    }
}
