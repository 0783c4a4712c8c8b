//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::admin::AdminGate;
use crate::config::ApiConfig;
use crate::content::ContentStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Content engine (loader, saver, change events)
    pub store: Arc<ContentStore>,
    /// Operator password gate and sessions
    pub gate: Arc<AdminGate>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Open WebSocket connections
    pub ws_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(store: Arc<ContentStore>, gate: AdminGate, config: ApiConfig) -> Self {
        Self {
            store,
            gate: Arc::new(gate),
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn ws_connection_count(&self) -> usize {
        self.ws_connections.load(Ordering::Relaxed)
    }
}
