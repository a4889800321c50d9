// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

use config::builder::DefaultState;
use config::ConfigBuilder;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, LoggingConfig, PerformanceConfig, RedirectConfig, ServerConfig,
};

/// Fallback domain for redirects when `BASE_FQDN` is unset or empty
pub const DEFAULT_BASE_FQDN: &str = "coollabs.io";

/// Environment variable overriding `redirect.base_fqdn`
pub const BASE_FQDN_ENV: &str = "BASE_FQDN";

impl Config {
    /// Load configuration from the process environment
    ///
    /// The first command line argument names the config file (without
    /// extension); `config` is used when absent.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
        Self::load_from(&path, base_fqdn_from_env())
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Sources in increasing priority: defaults, the optional file,
    /// `CDN_*` environment variables, then `base_fqdn` if given.
    pub fn load_from(
        config_path: &str,
        base_fqdn: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let settings = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CDN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("redirect.base_fqdn", base_fqdn)?
            .build()?;

        settings.try_deserialize()
    }

    /// Configuration made of built-in defaults only
    pub fn defaults() -> Result<Self, config::ConfigError> {
        with_defaults(config::Config::builder())?
            .build()?
            .try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 80)?
        .set_default("redirect.base_fqdn", DEFAULT_BASE_FQDN)?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "combined")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.read_timeout", 30)?
        .set_default("performance.write_timeout", 30)?
        .set_default("performance.shutdown_timeout", 30)
}

/// Read `BASE_FQDN`, treating an empty value as unset
pub fn base_fqdn_from_env() -> Option<String> {
    std::env::var(BASE_FQDN_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}
