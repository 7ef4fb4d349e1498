//! # wolverine-realtime
//!
//! Real-time presence and message-delivery layer for Wolverine House.
//! Provides:
//!
//! - Connection authentication from a signed token, before any state exists
//! - A presence registry (user id → live connection, last connection wins)
//! - Per-user delivery channels
//! - An event router for chat messages and typing indicators
//! - Connection lifecycle hooks, heartbeat, and diagnostics counters
//!
//! The crate is transport-agnostic: the HTTP layer owns the socket and
//! feeds text frames in, then drains [`connection::OutboundFrame`]s out.

pub mod channel;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod router;
pub mod server;

pub use channel::registry::ChannelRegistry;
pub use connection::manager::ConnectionManager;
pub use presence::registry::PresenceRegistry;
pub use server::RealtimeEngine;
