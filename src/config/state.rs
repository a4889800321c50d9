// Application state module
// Read-only state shared by every connection after startup

use super::types::Config;
use crate::assets::AssetStore;

/// Application state
///
/// Built once before the listener accepts and never mutated afterwards, so
/// request tasks read it through an `Arc` without locking.
pub struct AppState {
    pub config: Config,
    pub store: AssetStore,
    /// `https://{base_fqdn}`, computed once
    pub default_target: String,
}

impl AppState {
    pub fn new(config: Config, store: AssetStore) -> Self {
        let default_target = config.redirect.default_target();
        Self {
            config,
            store,
            default_target,
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
