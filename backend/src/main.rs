//! Backend entry-point: loads ledger settings, wires storage and serves the API.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use seed_ledger::inbound::http::health::HealthState;
use seed_ledger::outbound::persistence::{DbPool, PoolConfig, apply_pending_migrations};
use seed_ledger::settings::LedgerSettings;
use server::{ServerConfig, create_server};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

fn bind_addr() -> std::io::Result<SocketAddr> {
    let raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned());
    raw.parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR {raw:?}: {e}")))
}

/// Connect to PostgreSQL and bring the schema up to date.
async fn connect_database(database_url: String) -> std::io::Result<DbPool> {
    let migration_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || apply_pending_migrations(&migration_url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(applied, "database migrations applied");

    DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Option<PrometheusMetrics> {
    match PrometheusMetricsBuilder::new("seed_ledger")
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "Prometheus metrics disabled");
            None
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let policy = LedgerSettings::load()
        .map_err(|e| std::io::Error::other(format!("ledger settings: {e}")))?
        .into_policy()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr()?, policy);
    match env::var("DATABASE_URL") {
        Ok(url) => config = config.with_db_pool(connect_database(url).await?),
        Err(_) => warn!("DATABASE_URL not set"),
    }
    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(make_metrics());
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!("seed ledger listening");
    server.await
}
