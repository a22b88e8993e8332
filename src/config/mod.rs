use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub grants: GrantsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Upper bound on pooled SQLite connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            data_dir: default_data_dir(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Business thresholds used when enriching grants and building schedules.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantsConfig {
    /// A grant ending within this many days is flagged as expiring (default: 90)
    #[serde(default = "default_expiring_window_days")]
    pub expiring_window_days: i64,
    /// Unsubmitted reports due within this many days need attention (default: 30)
    #[serde(default = "default_upcoming_report_window_days")]
    pub upcoming_report_window_days: i64,
    /// The final report falls due this many days after the grant ends (default: 30)
    #[serde(default = "default_final_report_offset_days")]
    pub final_report_offset_days: i64,
    /// Currency applied when a request omits one (default: USD)
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for GrantsConfig {
    fn default() -> Self {
        Self {
            expiring_window_days: default_expiring_window_days(),
            upcoming_report_window_days: default_upcoming_report_window_days(),
            final_report_offset_days: default_final_report_offset_days(),
            default_currency: default_currency(),
        }
    }
}

fn default_expiring_window_days() -> i64 {
    90
}

fn default_upcoming_report_window_days() -> i64 {
    30
}

fn default_final_report_offset_days() -> i64 {
    30
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            grants: GrantsConfig::default(),
        }
    }
}
