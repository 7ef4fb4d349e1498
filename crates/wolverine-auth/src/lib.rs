//! # wolverine-auth
//!
//! Credential handling for the Wolverine House backend.
//!
//! The REST login flow and the real-time layer share one token format: an
//! HS256 JWT whose claims carry the user id. This crate verifies those
//! tokens and can mint them for local tooling.
//!
//! ## Modules
//!
//! - `jwt`: claims, decoding/verification, encoding

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
