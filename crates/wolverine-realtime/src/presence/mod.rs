//! Online-user tracking.

pub mod registry;

pub use registry::PresenceRegistry;
