//! Capabilities a guard controller consumes from its host.
//!
//! Controllers never look these up at runtime; they are bound when the
//! controller is constructed.

use glam::Vec3;
use std::sync::Arc;
use warden_common::LayerMask;

/// Path-following capability (navigation agent).
pub trait PathFollower {
    /// Issues a move command toward `destination`.
    fn set_destination(&mut self, destination: Vec3);
    /// Returns the last issued destination.
    fn destination(&self) -> Option<Vec3>;
    /// Whether a path computation is still outstanding.
    fn path_pending(&self) -> bool;
    /// Distance left to the current destination.
    fn remaining_distance(&self) -> f32;
    /// Current body position.
    fn position(&self) -> Vec3;
    /// Current body forward direction.
    fn forward(&self) -> Vec3;
    /// Teleports the body, keeping the current destination.
    fn warp(&mut self, position: Vec3);
    /// Integrates motion for `dt` seconds.
    fn advance(&mut self, dt: f32);
}

/// Which geometry blocks a sightline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SightFilter {
    /// Layers that block vision
    pub obstacles: LayerMask,
    /// Layers that never block vision (the target itself)
    pub ignore: LayerMask,
}

impl SightFilter {
    /// Creates a filter.
    #[must_use]
    pub const fn new(obstacles: LayerMask, ignore: LayerMask) -> Self {
        Self { obstacles, ignore }
    }

    /// Whether geometry on `layer` blocks a sightline under this filter.
    #[must_use]
    pub const fn blocks(&self, layer: LayerMask) -> bool {
        layer.intersects(self.obstacles) && !layer.intersects(self.ignore)
    }
}

/// Occlusion capability (physics raycast).
pub trait OcclusionQuery {
    /// Whether the straight segment `from -> to` is free of blocking geometry.
    fn is_clear(&self, from: Vec3, to: Vec3, filter: SightFilter) -> bool;
}

impl<T: OcclusionQuery + ?Sized> OcclusionQuery for &T {
    fn is_clear(&self, from: Vec3, to: Vec3, filter: SightFilter) -> bool {
        (**self).is_clear(from, to, filter)
    }
}

impl<T: OcclusionQuery + ?Sized> OcclusionQuery for Arc<T> {
    fn is_clear(&self, from: Vec3, to: Vec3, filter: SightFilter) -> bool {
        (**self).is_clear(from, to, filter)
    }
}

/// Occlusion query for an empty world.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSky;

impl OcclusionQuery for OpenSky {
    fn is_clear(&self, _from: Vec3, _to: Vec3, _filter: SightFilter) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ignores_target_layers() {
        let filter = SightFilter::new(LayerMask::OBSTACLE | LayerMask::TARGET, LayerMask::TARGET);
        assert!(filter.blocks(LayerMask::OBSTACLE));
        assert!(!filter.blocks(LayerMask::TARGET));
        assert!(!filter.blocks(LayerMask::DEFAULT));
    }

    #[test]
    fn test_shared_query_delegates() {
        let world = Arc::new(OpenSky);
        assert!(world.is_clear(Vec3::ZERO, Vec3::X, SightFilter::default()));
        let by_ref = &OpenSky;
        assert!(by_ref.is_clear(Vec3::ZERO, Vec3::X, SightFilter::default()));
    }
}
