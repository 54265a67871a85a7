//! Straight-line steering agent.
//!
//! A minimal [`PathFollower`] for hosts without a navigation mesh: the body
//! walks straight at its destination and faces the direction of travel.

use crate::capability::PathFollower;
use crate::transform::Transform;
use glam::Vec3;

/// Default walking speed in units per second.
pub const DEFAULT_SPEED: f32 = 3.5;

/// Path follower that moves in a straight line toward its destination.
#[derive(Debug, Clone)]
pub struct SteeringAgent {
    transform: Transform,
    speed: f32,
    destination: Option<Vec3>,
    pending: bool,
}

impl SteeringAgent {
    /// Creates an agent with the given body transform.
    #[must_use]
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            speed: DEFAULT_SPEED,
            destination: None,
            pending: false,
        }
    }

    /// Sets movement speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Returns the movement speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Returns the body transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }
}

impl PathFollower for SteeringAgent {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        // Resolved at the start of the next motion step
        self.pending = true;
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |dest| self.transform.position.distance(dest))
    }

    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn forward(&self) -> Vec3 {
        self.transform.forward
    }

    fn warp(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    fn advance(&mut self, dt: f32) {
        self.pending = false;
        let Some(dest) = self.destination else {
            return;
        };

        let to_dest = dest - self.transform.position;
        let dist = to_dest.length();
        if dist < f32::EPSILON {
            return;
        }

        let step = (self.speed * dt).min(dist);
        self.transform.position += to_dest / dist * step;

        let flat = Vec3::new(to_dest.x, 0.0, to_dest.z);
        if let Some(facing) = flat.try_normalize() {
            self.transform.forward = facing;
        }
    }
}
