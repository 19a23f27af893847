// Server loop module
// Accepts connections until shutdown, then drains in-flight ones

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop until `state.request_shutdown()` is called.
///
/// After shutdown the listener is dropped and open connections get up to
/// `performance.shutdown_grace` seconds to finish.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.connection_count());

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    if tokio::time::timeout(grace, wait_for_drain(&state)).await.is_err() {
        logger::log_warning(&format!(
            "[Shutdown] Grace period of {}s elapsed with {} connections open",
            grace.as_secs(),
            state.connection_count()
        ));
    } else {
        logger::log_info("[Shutdown] All connections closed");
    }
}

async fn wait_for_drain(state: &AppState) {
    while state.connection_count() > 0 {
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
