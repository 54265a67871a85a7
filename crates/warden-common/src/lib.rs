//! # Warden Common
//!
//! Common types and shared abstractions for Warden.
//!
//! This crate provides foundational types used across the Warden crates:
//! - ID types (AgentId)
//! - Collision layer masks
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod layers;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::layers::*;
}

pub use prelude::*;
