//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use wolverine_auth::JwtDecoder;
use wolverine_core::config::AppConfig;
use wolverine_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Builds the state and the realtime engine from configuration.
    pub fn new(config: AppConfig) -> Self {
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), decoder));

        Self {
            config: Arc::new(config),
            realtime,
        }
    }
}
