// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGHUP:  Reopen log files
// - SIGUSR1: Reopen log files

use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

/// Start signal handlers (Unix)
///
/// | Signal  | Action            |
/// |---------|-------------------|
/// | SIGTERM | Graceful stop     |
/// | SIGINT  | Graceful stop     |
/// | SIGHUP  | Reopen log files  |
/// | SIGUSR1 | Reopen log files  |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let registered = (|| {
            Ok::<_, std::io::Error>((
                signal(SignalKind::terminate())?,
                signal(SignalKind::interrupt())?,
                signal(SignalKind::hangup())?,
                signal(SignalKind::user_defined1())?,
            ))
        })();
        let (mut sigterm, mut sigint, mut sighup, mut sigusr1) = match registered {
            Ok(signals) => signals,
            Err(e) => {
                logger::log_error(&format!("[Signal] Failed to register handlers: {e}"));
                return;
            }
        };

        logger::log_debug(&format!(
            "[Signal] Handlers registered for process {}",
            std::process::id()
        ));

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    logger::log_info("[Signal] SIGTERM received, shutting down");
                    state.request_shutdown();
                    break;
                }
                _ = sigint.recv() => {
                    logger::log_info("[Signal] SIGINT received, shutting down");
                    state.request_shutdown();
                    break;
                }
                _ = sighup.recv() => reopen_logs("SIGHUP"),
                _ = sigusr1.recv() => reopen_logs("SIGUSR1"),
            }
        }
    });
}

/// Non-Unix fallback: only Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_info("[Signal] Ctrl+C received, shutting down");
            state.request_shutdown();
        }
    });
}

#[cfg(unix)]
fn reopen_logs(signal_name: &str) {
    match logger::reopen() {
        Ok(()) => logger::log_info(&format!("[Signal] {signal_name} received, log files reopened")),
        Err(e) => logger::log_error(&format!("[Signal] Failed to reopen log files: {e}")),
    }
}
