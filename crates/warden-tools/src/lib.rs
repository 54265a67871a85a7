//! # Warden Tools
//!
//! Development tools for Warden.
//!
//! This crate provides:
//! - Text developer console (bounded history and output log)
//! - Guard commands: batch reset by label and a state listing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod console;
pub mod guard_commands;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::console::*;
    pub use crate::guard_commands::*;
}

pub use prelude::*;
