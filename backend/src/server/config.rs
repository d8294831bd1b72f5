//! Startup settings consumed by [`super::create_server`].

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use seed_ledger::domain::LedgerPolicy;
use seed_ledger::outbound::persistence::DbPool;

/// Where ledger events are stored.
pub(crate) enum LedgerStore {
    Postgres(DbPool),
    /// Process-local; lost on restart.
    Memory,
}

/// Listener, ledger policy and adapters for one server instance.
pub struct ServerConfig {
    pub(crate) listen: SocketAddr,
    pub(crate) policy: LedgerPolicy,
    pub(crate) store: LedgerStore,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// In-memory ledger on `listen` until a pool is supplied.
    #[must_use]
    pub fn new(listen: SocketAddr, policy: LedgerPolicy) -> Self {
        Self {
            listen,
            policy,
            store: LedgerStore::Memory,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Store events in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(self, pool: DbPool) -> Self {
        Self {
            store: LedgerStore::Postgres(pool),
            ..self
        }
    }

    /// Export request and ledger metrics through `prometheus`, if built.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(self, prometheus: Option<PrometheusMetrics>) -> Self {
        Self { prometheus, ..self }
    }
}
