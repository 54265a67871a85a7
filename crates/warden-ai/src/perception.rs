//! Vision cone perception for guards.
//!
//! A target is perceived when all three checks pass:
//! - it is strictly closer than the detection radius
//! - it lies strictly inside the view cone (half-angle to either side of forward)
//! - the straight sightline to it is not blocked by obstacle geometry

use crate::capability::{OcclusionQuery, SightFilter};
use crate::config::AgentConfig;
use glam::Vec3;

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Returns 0 when either vector is (near) zero length.
#[must_use]
pub fn angle_between_degrees(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < 1e-15 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Range, cone and occlusion test. Stateless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionGate {
    detection_radius: f32,
    view_angle_degrees: f32,
    filter: SightFilter,
}

impl PerceptionGate {
    /// Creates a gate.
    #[must_use]
    pub const fn new(detection_radius: f32, view_angle_degrees: f32, filter: SightFilter) -> Self {
        Self {
            detection_radius,
            view_angle_degrees,
            filter,
        }
    }

    /// Creates a gate from a guard's configuration.
    #[must_use]
    pub const fn from_config(config: &AgentConfig) -> Self {
        Self::new(
            config.detection_radius,
            config.view_angle_degrees,
            config.sight_filter(),
        )
    }

    /// Returns the detection radius.
    #[must_use]
    pub const fn detection_radius(&self) -> f32 {
        self.detection_radius
    }

    /// Returns the full view angle in degrees.
    #[must_use]
    pub const fn view_angle_degrees(&self) -> f32 {
        self.view_angle_degrees
    }

    /// Whether a target at `target` is within range and inside the cone,
    /// ignoring occlusion.
    #[must_use]
    pub fn in_cone(&self, observer: Vec3, forward: Vec3, target: Vec3) -> bool {
        let to_target = target - observer;
        if to_target.length() >= self.detection_radius {
            return false;
        }
        angle_between_degrees(forward, to_target) < self.view_angle_degrees / 2.0
    }

    /// Whether the observer perceives the target.
    ///
    /// `None` means no target is bound and is never perceived.
    #[must_use]
    pub fn can_perceive<O: OcclusionQuery + ?Sized>(
        &self,
        occlusion: &O,
        observer: Vec3,
        forward: Vec3,
        target: Option<Vec3>,
    ) -> bool {
        let Some(target) = target else {
            return false;
        };
        self.in_cone(observer, forward, target) && occlusion.is_clear(observer, target, self.filter)
    }
}
