use config::{Config as ConfigLoader, ConfigError, Environment, File};
use counsel_llm::OpenAIConfig;
use counsel_types::WireFormat;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub idle_timeout_ms: u64,
    pub request_timeout_secs: u64,
    /// Used when a request carries no `format` query parameter
    pub wire_format: WireFormat,
    pub channel_capacity: usize,
    /// Appended to the assistant's instructions on every run
    pub additional_instructions: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 60_000,
            request_timeout_secs: 300,
            wire_format: WireFormat::Ndjson,
            channel_capacity: 64,
            additional_instructions: None,
        }
    }
}

impl RelayConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `COUNSEL_`-prefixed environment variables, `__` between levels
    ///    (e.g. `COUNSEL_RELAY__IDLE_TIMEOUT_MS=30000`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("COUNSEL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Provider client settings
    pub fn openai_config(&self) -> OpenAIConfig {
        let config = OpenAIConfig::new(self.openai_api_key.clone());
        match &self.openai.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        }
    }
}
