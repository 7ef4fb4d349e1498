//! Health check handlers.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wolverine_realtime::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerResponse {
    /// Fixed liveness message.
    pub message: String,
    /// Deployment environment name.
    pub environment: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Users with a registered connection.
    pub online_users: usize,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Realtime counters.
    pub metrics: MetricsSnapshot,
}

/// GET /
pub async fn banner(State(state): State<AppState>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Backend is working now!".to_string(),
        environment: state.config.server.environment.clone(),
        timestamp: Utc::now(),
    })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = &state.realtime;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        online_users: engine.presence.online_count(),
        connections: engine.connections.connection_count(),
        metrics: engine.metrics(),
    })
}
