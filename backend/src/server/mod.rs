//! Assembles the Actix application and binds the listener.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use seed_ledger::Trace;
use seed_ledger::inbound::http::health::{self, HealthState};
use seed_ledger::inbound::http::seed;
use seed_ledger::inbound::http::state::HttpState;
use state_builders::build_http_state;

/// Prefix for the versioned ledger API.
const API_PREFIX: &str = "/api/v1";

fn routes(config: &mut web::ServiceConfig) {
    config
        .service(web::scope(API_PREFIX).configure(seed::configure))
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    config.service(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", seed_ledger::ApiDoc::openapi()),
    );
}

fn ledger_app(
    health: web::Data<HealthState>,
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health)
        .app_data(state)
        .wrap(Trace)
        .configure(routes)
}

/// Bind the ledger API and return the running server.
///
/// Readiness flips to passing once the socket is bound. Await the returned
/// [`Server`] to serve requests.
///
/// # Errors
/// Fails when ledger metrics cannot be registered or the address cannot be
/// bound.
pub fn create_server(
    health: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let state = build_http_state(&config)?;
    #[cfg(feature = "metrics")]
    let metrics = MetricsLayer::new(config.prometheus.clone());

    let factory_health = health.clone();
    let server = HttpServer::new(move || {
        let app = ledger_app(factory_health.clone(), state.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());
        app
    })
    .bind(config.listen)?
    .run();

    health.mark_ready();
    Ok(server)
}
