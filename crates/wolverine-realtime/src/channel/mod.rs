//! Per-user delivery channels.

pub mod registry;
pub mod types;

pub use registry::ChannelRegistry;
pub use types::ChannelName;
