use std::sync::Arc;
use tokio::sync::Notify;

use versions_cdn::assets::AssetStore;
use versions_cdn::config::{AppState, Config};
use versions_cdn::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Worker count follows the config, defaulting to the number of cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // A directory that cannot be listed aborts startup
    let (store, report) = AssetStore::load(&cfg.assets)?;
    logger::log_assets_loaded(&report, &store.paths());

    let listener = server::create_listener(addr)?;
    let state = Arc::new(AppState::new(cfg, store));
    logger::log_server_start(&addr, &state.config, state.store.len());

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::serve(listener, state, shutdown).await?;
    Ok(())
}
