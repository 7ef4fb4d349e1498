//! WebSocket connection management.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use authenticator::{ConnectionIdentity, WsAuthenticator};
pub use handle::{CloseReason, ConnectionHandle, OutboundFrame};
pub use manager::ConnectionManager;
