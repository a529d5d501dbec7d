pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chain::registry::ChainRegistry;
use crate::explorer::ExplorerClient;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ChainRegistry>,
    pub explorer: ExplorerClient,
}

pub fn router(registry: Arc<ChainRegistry>, explorer: ExplorerClient) -> Router {
    let state = Arc::new(AppState { registry, explorer });

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/chains", get(handlers::list_chains))
        .route("/api/v1/abi", get(handlers::contract_abi))
        .route("/api/v1/claim-stats", post(handlers::claim_stats))
        .route("/api/v1/read", post(handlers::read_contract))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    registry: Arc<ChainRegistry>,
    explorer: ExplorerClient,
    host: &str,
    port: u16,
) -> eyre::Result<()> {
    let app = router(registry, explorer);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
