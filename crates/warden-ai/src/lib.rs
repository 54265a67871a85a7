//! # Warden AI
//!
//! Guard behavior for Warden.
//!
//! This crate provides:
//! - Vision cone perception (range, view angle, occlusion)
//! - Patrol/chase state machine with a lost-target grace period
//! - Capability traits for path following and occlusion queries
//! - Reference implementations: straight-line steering, obstacle field
//! - Label registry and batch reset
//! - Fixed-step simulation loop
//! - Debug gizmo geometry

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod batch;
pub mod capability;
pub mod config;
pub mod controller;
pub mod gizmos;
pub mod obstacles;
pub mod perception;
pub mod simulation;
pub mod steering;
pub mod tags;
pub mod transform;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::capability::*;
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::gizmos::*;
    pub use crate::obstacles::*;
    pub use crate::perception::*;
    pub use crate::simulation::*;
    pub use crate::steering::*;
    pub use crate::tags::*;
    pub use crate::transform::*;
}

pub use prelude::*;
