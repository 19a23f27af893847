// Application state module
// Shared, read-mostly state handed to every connection

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::discord::UserDirectory;
use crate::identity::Cdn;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Upstream user lookup
    pub directory: Arc<dyn UserDirectory>,
    /// CDN used to resolve avatar and banner URLs
    pub cdn: Cdn,
    /// Open connections, checked against `performance.max_connections`
    pub active_connections: AtomicUsize,
    /// Fired once when the process should stop accepting connections
    pub shutdown: Notify,
    shutdown_requested: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, directory: Arc<dyn UserDirectory>) -> Self {
        let cdn = Cdn::new(&config.discord.cdn_base);
        Self {
            config,
            directory,
            cdn,
            active_connections: AtomicUsize::new(0),
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Ask the accept loop to stop. Safe to call more than once.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a loop that is not parked yet still sees it
        self.shutdown.notify_one();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
