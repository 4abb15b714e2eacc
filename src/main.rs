//! searcher-gateway HTTP server entry point

use anyhow::Result;
use searcher_gateway::{
    config,
    searchers::SearcherLoader,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings come first: `general.debug` picks the default log level
    let settings = config::load()?;

    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting searcher-gateway v{}", searcher_gateway::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    // Load searchers
    let registry = SearcherLoader::load(&settings)?;
    if registry.is_empty() {
        info!("No searchers configured; every query will report an unknown searcher");
    }

    // Create application state
    let state = AppState::new(settings.clone(), registry);

    let app = create_router(state);

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
