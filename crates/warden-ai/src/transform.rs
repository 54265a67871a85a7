//! Position and facing of simulated bodies.

use glam::Vec3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// World-space position and facing of a body. Y is up; yaw 0 faces +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world units
    pub position: Vec3,
    /// Normalized forward direction
    pub forward: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Transform {
    /// Creates a transform at `position` facing +Z.
    #[must_use]
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            forward: Vec3::Z,
        }
    }

    /// Sets the forward direction. Degenerate directions keep the current facing.
    #[must_use]
    pub fn with_forward(mut self, forward: Vec3) -> Self {
        if let Some(dir) = forward.try_normalize() {
            self.forward = dir;
        }
        self
    }

    /// Sets the facing from a yaw angle in degrees.
    #[must_use]
    pub fn with_yaw(mut self, yaw_degrees: f32) -> Self {
        let yaw = yaw_degrees.to_radians();
        self.forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        self
    }

    /// Returns the yaw of the forward direction in degrees.
    #[must_use]
    pub fn yaw_degrees(&self) -> f32 {
        self.forward.x.atan2(self.forward.z).to_degrees()
    }
}

/// A transform owned by the host and observed by controllers.
pub type SharedTransform = Arc<RwLock<Transform>>;

/// Non-owning handle to a [`SharedTransform`].
pub type TransformRef = Weak<RwLock<Transform>>;

/// Wraps a transform for sharing with controllers.
#[must_use]
pub fn shared(transform: Transform) -> SharedTransform {
    Arc::new(RwLock::new(transform))
}
