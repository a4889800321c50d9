// Server loop module
// Accepts connections until a shutdown is requested, then drains them

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop for the asset server
///
/// Once `shutdown` is notified the listener is closed and every open
/// connection is asked to finish its current request. Returns when they
/// have all closed or `performance.shutdown_timeout` has elapsed.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let drain_limit = state.config.performance.shutdown_timeout;
    tokio::select! {
        () = graceful.shutdown() => logger::log_drained(),
        () = tokio::time::sleep(Duration::from_secs(drain_limit)) => {
            logger::log_drain_timeout(drain_limit, active_connections.load(Ordering::SeqCst));
        }
    }

    Ok(())
}
