// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Start signal handlers (Unix only)
///
/// Spawns a background task that notifies `shutdown` on the first
/// SIGTERM or SIGINT.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        logger::log_debug(&format!(
            "[SIGNAL] SIGTERM/SIGINT handlers registered for process {}",
            std::process::id()
        ));

        tokio::select! {
            _ = sigterm.recv() => logger::log_info("[SIGNAL] Received SIGTERM, shutting down"),
            _ = sigint.recv() => logger::log_info("[SIGNAL] Received SIGINT, shutting down"),
        }
        // Stores a permit if the accept loop is not waiting yet
        shutdown.notify_one();
    });
}

/// Start signal handlers (non-Unix: Ctrl+C only)
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_info("[SIGNAL] Received Ctrl+C, shutting down");
                shutdown.notify_one();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}
