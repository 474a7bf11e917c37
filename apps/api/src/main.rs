mod config;
mod errors;
mod llm_client;
mod outreach;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::outreach::acquisition::AcquisitionController;
use crate::outreach::intelligence::LlmTitleSource;
use crate::outreach::people_search::{ApolloClient, PeopleSearch};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Outreach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (intelligence source)
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize people-search provider
    let people_search: Arc<dyn PeopleSearch> = Arc::new(ApolloClient::new(
        config.apollo_api_key.clone(),
        config.apollo_base_url.clone(),
        config.http_timeout,
    )?);
    info!(
        "People search client initialized ({}, timeout {}s)",
        config.apollo_base_url,
        config.http_timeout.as_secs()
    );

    let acquisition = AcquisitionController::new(
        people_search.clone(),
        Arc::new(LlmTitleSource::new(llm)),
        config.acquisition.clone(),
    );
    info!(
        "Acquisition: max_pages={} per_page={} seniorities={:?}",
        config.acquisition.max_pages, config.acquisition.per_page, config.acquisition.seniorities
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        people_search,
        acquisition: Arc::new(acquisition),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the dashboard domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
