use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section can be omitted from `config.toml`; the defaults are good
/// enough to run against the public provider out of the box.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub analysis: AnalysisDefaults,
}

impl Config {
    /// Rejects settings that would make every request fail later anyway.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.lookback_days < 1 {
            return Err(ConfigError::ValidationError(
                "analysis.lookback_days must be at least 1".to_string(),
            ));
        }
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contains the bind settings for the web server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The network interface the server binds to (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// The port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Contains the settings for the upstream daily-history provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the chart API the provider client talks to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent header sent with every provider request. The public
    /// endpoint rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Contains the per-request defaults that the web UI and CLI fall back to.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisDefaults {
    /// Length of the default analysis window, ending today, used when a
    /// request does not name its own dates.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// The annual risk-free rate used for the Sharpe ratio (0.04 for 4%).
    #[serde(default)]
    pub risk_free_rate: f64,
    /// Where CSV snapshots are written. Defaults to the system temp directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

// --- Default Implementations ---
// These allow a user to omit whole sections (or single keys) from their toml
// and still have it work with sensible defaults.

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            risk_free_rate: 0.0,
            export_dir: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; meridian/0.1)".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_lookback_days() -> i64 {
    365
}
