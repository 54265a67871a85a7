//! Per-guard tuning.
//!
//! Values can be built in code or parsed from a TOML table; missing keys fall
//! back to the defaults below.

use serde::{Deserialize, Serialize};
use warden_common::{ConfigError, LayerMask};

use crate::capability::SightFilter;

/// Default detection radius in world units.
pub const DEFAULT_DETECTION_RADIUS: f32 = 10.0;
/// Default full view-cone angle in degrees.
pub const DEFAULT_VIEW_ANGLE: f32 = 90.0;
/// Default time a lost target may stay unseen before giving up the chase.
pub const DEFAULT_LOST_TARGET_GRACE: f32 = 2.0;
/// Default dwell time at each patrol waypoint.
pub const DEFAULT_PATROL_WAIT: f32 = 2.0;
/// Default distance at which a waypoint counts as reached.
pub const DEFAULT_ARRIVAL_THRESHOLD: f32 = 0.5;

/// Static configuration of a patrol/chase guard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Radius of the detection sphere
    pub detection_radius: f32,
    /// Full angle of the view cone in degrees (0-360)
    pub view_angle_degrees: f32,
    /// Seconds a target may stay unseen before returning to patrol
    pub lost_target_grace_seconds: f32,
    /// Seconds spent waiting at each waypoint
    pub patrol_wait_seconds: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_threshold: f32,
    /// Layers that block vision
    pub obstacle_mask: LayerMask,
    /// Layers the target occupies (never block vision)
    pub target_mask: LayerMask,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_radius: DEFAULT_DETECTION_RADIUS,
            view_angle_degrees: DEFAULT_VIEW_ANGLE,
            lost_target_grace_seconds: DEFAULT_LOST_TARGET_GRACE,
            patrol_wait_seconds: DEFAULT_PATROL_WAIT,
            arrival_threshold: DEFAULT_ARRIVAL_THRESHOLD,
            obstacle_mask: LayerMask::OBSTACLE,
            target_mask: LayerMask::TARGET,
        }
    }
}

impl AgentConfig {
    /// Sets detection radius.
    #[must_use]
    pub const fn with_detection_radius(mut self, radius: f32) -> Self {
        self.detection_radius = radius;
        self
    }

    /// Sets view angle.
    #[must_use]
    pub const fn with_view_angle(mut self, degrees: f32) -> Self {
        self.view_angle_degrees = degrees;
        self
    }

    /// Sets lost-target grace.
    #[must_use]
    pub const fn with_lost_target_grace(mut self, seconds: f32) -> Self {
        self.lost_target_grace_seconds = seconds;
        self
    }

    /// Sets waypoint dwell time.
    #[must_use]
    pub const fn with_patrol_wait(mut self, seconds: f32) -> Self {
        self.patrol_wait_seconds = seconds;
        self
    }

    /// Sets obstacle and target masks.
    #[must_use]
    pub const fn with_masks(mut self, obstacles: LayerMask, target: LayerMask) -> Self {
        self.obstacle_mask = obstacles;
        self.target_mask = target;
        self
    }

    /// Sightline filter derived from the masks.
    #[must_use]
    pub const fn sight_filter(&self) -> SightFilter {
        SightFilter::new(self.obstacle_mask, self.target_mask)
    }

    /// Checks every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.detection_radius.is_finite() && self.detection_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.detection_radius));
        }
        if !(0.0..=360.0).contains(&self.view_angle_degrees) {
            return Err(ConfigError::InvalidViewAngle(self.view_angle_degrees));
        }
        if !(self.lost_target_grace_seconds.is_finite() && self.lost_target_grace_seconds > 0.0) {
            return Err(ConfigError::InvalidGrace(self.lost_target_grace_seconds));
        }
        if !(self.patrol_wait_seconds.is_finite() && self.patrol_wait_seconds >= 0.0) {
            return Err(ConfigError::InvalidWait(self.patrol_wait_seconds));
        }
        if !(self.arrival_threshold.is_finite() && self.arrival_threshold > 0.0) {
            return Err(ConfigError::InvalidArrival(self.arrival_threshold));
        }
        Ok(())
    }
}
