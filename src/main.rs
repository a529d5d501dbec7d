use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use claimscope::chain::registry::ChainRegistry;
use claimscope::config::Config;
use claimscope::explorer::ExplorerClient;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=info for output)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("Claimscope starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path)?;
    tracing::info!(
        etherscan_key = config.explorer.etherscan_api_key.is_some(),
        "Configuration loaded from {}",
        config_path
    );

    let registry = Arc::new(ChainRegistry::new());
    let explorer = ExplorerClient::new(config.explorer.etherscan_api_key.clone());

    claimscope::api::serve(registry, explorer, &config.api.host, config.api.port).await
}
