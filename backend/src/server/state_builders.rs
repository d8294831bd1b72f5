//! Builders for the HTTP state backing the ledger endpoints.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use seed_ledger::domain::SeedLedgerService;
use seed_ledger::domain::ports::SeedLedgerRepository;
use seed_ledger::inbound::http::state::HttpState;
use seed_ledger::outbound::memory::InMemorySeedLedgerRepository;
#[cfg(feature = "metrics")]
use seed_ledger::outbound::metrics::PrometheusSeedLedgerMetrics;
use seed_ledger::outbound::persistence::DieselSeedLedgerRepository;

use super::ServerConfig;
use super::config::LedgerStore;

/// Register Prometheus ledger counters when a registry is configured.
///
/// # Errors
/// Returns [`std::io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn attach_metrics<R>(
    service: SeedLedgerService<R>,
    config: &ServerConfig,
) -> std::io::Result<SeedLedgerService<R>> {
    let Some(prometheus) = &config.prometheus else {
        return Ok(service);
    };
    let metrics = PrometheusSeedLedgerMetrics::new(&prometheus.registry).map_err(|e| {
        std::io::Error::other(format!("seed ledger metrics registration failed: {e}"))
    })?;
    Ok(service.with_metrics(Arc::new(metrics)))
}

#[cfg(not(feature = "metrics"))]
fn attach_metrics<R>(
    service: SeedLedgerService<R>,
    _config: &ServerConfig,
) -> std::io::Result<SeedLedgerService<R>> {
    Ok(service)
}

fn ledger_state<R>(repo: Arc<R>, config: &ServerConfig) -> std::io::Result<web::Data<HttpState>>
where
    R: SeedLedgerRepository + 'static,
{
    let service = SeedLedgerService::new(repo, Arc::new(DefaultClock), config.policy.clone());
    let service = attach_metrics(service, config)?;
    Ok(web::Data::new(HttpState::from_service(Arc::new(service))))
}

/// HTTP state over the configured [`LedgerStore`].
///
/// # Errors
/// Propagates metric registration failures.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    match &config.store {
        LedgerStore::Postgres(pool) => ledger_state(
            Arc::new(DieselSeedLedgerRepository::new(pool.clone())),
            config,
        ),
        LedgerStore::Memory => {
            warn!("no database configured; ledger events are kept in memory only");
            ledger_state(Arc::new(InMemorySeedLedgerRepository::new()), config)
        }
    }
}
