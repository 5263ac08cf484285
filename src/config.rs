//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `EPIWATCH_*` environment overrides.

use crate::api::ApiConfig;
use crate::dashboard::DashboardConfig;
use crate::remote::RemoteConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote pandemic API
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSection {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_population_url")]
    pub population_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_population_url() -> String {
    "https://restcountries.com/v3.1".to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            population_url: default_population_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// HTTP service
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Dashboard behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSection {
    #[serde(default = "default_virus")]
    pub default_virus: String,

    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_virus() -> String {
    "COVID-19".to_string()
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            default_virus: default_virus(),
            refresh_interval_secs: default_refresh_interval(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive: `RUST_LOG` when set, else `epiwatch=<level>`
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("epiwatch={},tower_http=info", self.level))
        })
    }

    /// Install the global subscriber (`json` or human-readable output)
    pub fn init(&self) {
        let registry = tracing_subscriber::registry().with(self.filter());
        if self.format.eq_ignore_ascii_case("json") {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default search order: user config dir, `/etc/epiwatch`, working dir
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("epiwatch").join("config.toml")),
            Some(PathBuf::from("/etc/epiwatch/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> ConfigLoad {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first existing file of `paths` that parses
    ///
    /// Files that exist but fail to load are recorded and skipped. Nothing
    /// is logged here since logging is configured from the result.
    pub fn load_first(paths: &[PathBuf]) -> ConfigLoad {
        let mut errors = Vec::new();

        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        return ConfigLoad {
                            config,
                            path: Some(path.clone()),
                            errors,
                        }
                    }
                    Err(e) => errors.push(e),
                }
            }
        }

        ConfigLoad {
            config: Self::from_env(),
            path: None,
            errors,
        }
    }

    /// Apply `EPIWATCH_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    ///
    /// Numeric values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Remote overrides
        if let Some(url) = lookup("EPIWATCH_API_URL") {
            self.remote.base_url = url;
        }
        if let Some(url) = lookup("EPIWATCH_POPULATION_URL") {
            self.remote.population_url = url;
        }
        if let Some(ms) = lookup("EPIWATCH_REQUEST_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.remote.request_timeout_ms = ms;
        }

        // Server overrides
        if let Some(host) = lookup("EPIWATCH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("EPIWATCH_PORT").and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }

        // Dashboard overrides
        if let Some(virus) = lookup("EPIWATCH_DEFAULT_VIRUS") {
            self.dashboard.default_virus = virus;
        }
        if let Some(secs) = lookup("EPIWATCH_REFRESH_SECS").and_then(|s| s.parse().ok()) {
            self.dashboard.refresh_interval_secs = secs;
        }

        // Logging overrides
        if let Some(level) = lookup("EPIWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("EPIWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.remote.base_url.clone(),
            population_url: self.remote.population_url.clone(),
            request_timeout_ms: self.remote.request_timeout_ms,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.server.host.clone(), self.server.port)
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            preferred_virus: self.dashboard.default_virus.clone(),
            refresh_interval_secs: self.dashboard.refresh_interval_secs,
            cache_capacity: self.dashboard.cache_capacity,
        }
    }
}

/// Result of searching the config locations
#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub path: Option<PathBuf>,
    /// Files that existed but could not be loaded
    pub errors: Vec<ConfigError>,
}

impl ConfigLoad {
    /// Report the outcome; call once the subscriber is installed
    pub fn log(&self) {
        for e in &self.errors {
            tracing::warn!("{}", e);
        }
        match &self.path {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# epiwatch Configuration
#
# Environment variables override these settings:
# - EPIWATCH_API_URL
# - EPIWATCH_POPULATION_URL
# - EPIWATCH_REQUEST_TIMEOUT_MS
# - EPIWATCH_HOST
# - EPIWATCH_PORT
# - EPIWATCH_DEFAULT_VIRUS
# - EPIWATCH_REFRESH_SECS
# - EPIWATCH_LOG_LEVEL
# - EPIWATCH_LOG_FORMAT

[remote]
# Pandemic API base URL
base_url = "http://localhost:8000"

# Country metadata service (population lookup)
population_url = "https://restcountries.com/v3.1"

# Per-request timeout (ms)
request_timeout_ms = 10000

[server]
# Dashboard service host
host = "0.0.0.0"

# Dashboard service port
port = 8090

[dashboard]
# Virus selected when none is requested (falls back to the first known virus)
default_virus = "COVID-19"

# Background refresh period in seconds (0 disables)
refresh_interval_secs = 300

# Continent and country views kept per snapshot
cache_capacity = 256

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
