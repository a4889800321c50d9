//! Bundled asset server
//!
//! Serves version metadata and images embedded at build time, with `ETag`
//! revalidation, byte ranges and legacy path redirects.
//!
//! Startup builds an [`assets::AssetStore`] and wraps it with the
//! configuration in an [`config::AppState`]. Request tasks then share that
//! state read-only through the [`server`] accept loop.

pub mod assets;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
