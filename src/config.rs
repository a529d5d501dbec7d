use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExplorerConfig {
    /// Etherscan V2 key, shared across all Etherscan-served chains.
    /// Falls back to the ETHERSCAN_API_KEY environment variable.
    pub etherscan_api_key: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file. A missing file is not an
    /// error: everything has a default and the key can come from the
    /// environment.
    pub fn load(path: &str) -> eyre::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Config>(&content)
                .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at '{}', using defaults", path);
                Config::default()
            }
            Err(e) => return Err(eyre::eyre!("Failed to read config file '{}': {}", path, e)),
        };

        if config.explorer.etherscan_api_key.is_none() {
            config.explorer.etherscan_api_key = std::env::var("ETHERSCAN_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }

        Ok(config)
    }
}
