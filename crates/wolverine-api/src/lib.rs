//! # wolverine-api
//!
//! HTTP layer for Wolverine House built on Axum.
//!
//! Serves the liveness banner, the health endpoint, and the authenticated
//! WebSocket upgrade that feeds the real-time engine. Also maps
//! [`wolverine_core::AppError`] onto HTTP responses.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod telemetry;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
