//! Debug geometry for a guard's detection range and view cone.
//!
//! Purely diagnostic; hosts may draw or log it.

use crate::config::AgentConfig;
use crate::transform::Transform;
use glam::Vec3;

/// Converts an angle in degrees to a horizontal direction.
///
/// Local angles are measured from `yaw_degrees`; global angles ignore it.
#[must_use]
pub fn dir_from_angle(angle_degrees: f32, yaw_degrees: f32, global: bool) -> Vec3 {
    let angle = if global {
        angle_degrees
    } else {
        angle_degrees + yaw_degrees
    }
    .to_radians();
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

/// Detection sphere and view-cone edges of one guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionGizmo {
    /// Sphere center (guard position)
    pub center: Vec3,
    /// Detection radius
    pub radius: f32,
    /// Left cone edge direction
    pub left_edge: Vec3,
    /// Right cone edge direction
    pub right_edge: Vec3,
}

impl DetectionGizmo {
    /// Builds the gizmo for a guard body and its configuration.
    #[must_use]
    pub fn for_guard(body: &Transform, config: &AgentConfig) -> Self {
        let yaw = body.yaw_degrees();
        let half = config.view_angle_degrees / 2.0;
        Self {
            center: body.position,
            radius: config.detection_radius,
            left_edge: dir_from_angle(-half, yaw, false),
            right_edge: dir_from_angle(half, yaw, false),
        }
    }

    /// End points of the two cone edge lines.
    #[must_use]
    pub fn edge_lines(&self) -> [(Vec3, Vec3); 2] {
        [
            (self.center, self.center + self.left_edge * self.radius),
            (self.center, self.center + self.right_edge * self.radius),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_from_angle_local_and_global() {
        assert!((dir_from_angle(0.0, 90.0, false) - Vec3::X).length() < 1e-5);
        assert!((dir_from_angle(0.0, 90.0, true) - Vec3::Z).length() < 1e-5);
        assert!((dir_from_angle(-90.0, 0.0, false) + Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_gizmo_edges_straddle_forward() {
        let body = Transform::new(Vec3::new(1.0, 0.0, 2.0));
        let gizmo = DetectionGizmo::for_guard(&body, &AgentConfig::default());
        assert_eq!(gizmo.radius, 10.0);

        let diag = std::f32::consts::FRAC_1_SQRT_2;
        assert!((gizmo.left_edge - Vec3::new(-diag, 0.0, diag)).length() < 1e-5);
        assert!((gizmo.right_edge - Vec3::new(diag, 0.0, diag)).length() < 1e-5);

        let [(start, end), _] = gizmo.edge_lines();
        assert_eq!(start, body.position);
        assert!((end.distance(start) - 10.0).abs() < 1e-4);
    }
}
