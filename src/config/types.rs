// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redirect: RedirectConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Redirect configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedirectConfig {
    /// Domain that `/` and unknown paths bounce to
    pub base_fqdn: String,
}

impl RedirectConfig {
    /// Absolute URL used for default and fallback redirects
    pub fn default_target(&self) -> String {
        format!("https://{}", self.base_fqdn)
    }
}

/// Asset source configuration
///
/// Both directories are optional; when unset the trees embedded at build
/// time are served.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AssetsConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub images_dir: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for open connections after a shutdown signal
    pub shutdown_timeout: u64,
}
