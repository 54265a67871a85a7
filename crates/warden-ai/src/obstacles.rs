//! Static obstacle geometry and ray queries against it.
//!
//! ## Overview
//!
//! The obstacle field supports:
//! - Box and sphere obstacles, each on a collision layer
//! - Raycasting (shoot a ray, find the nearest blocking hit)
//! - Sightline queries used by guard perception

use crate::capability::{OcclusionQuery, SightFilter};
use glam::Vec3;
use warden_common::LayerMask;

/// Result of a raycast operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the obstacle that was hit
    pub obstacle: usize,
    /// Distance from ray origin to hit
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Shape of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    /// Axis-aligned box
    Box {
        /// Minimum corner
        min: Vec3,
        /// Maximum corner
        max: Vec3,
    },
    /// Sphere
    Sphere {
        /// Center point
        center: Vec3,
        /// Radius
        radius: f32,
    },
}

impl ObstacleShape {
    /// Distance along a normalized ray to the first surface entry.
    ///
    /// Rays that start inside the shape do not report it.
    fn ray_entry(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        match *self {
            ObstacleShape::Box { min, max } => {
                let mut t_near = f32::NEG_INFINITY;
                let mut t_far = f32::INFINITY;
                for axis in 0..3 {
                    let o = origin[axis];
                    let d = dir[axis];
                    if d.abs() < f32::EPSILON {
                        if o < min[axis] || o > max[axis] {
                            return None;
                        }
                        continue;
                    }
                    let t1 = (min[axis] - o) / d;
                    let t2 = (max[axis] - o) / d;
                    t_near = t_near.max(t1.min(t2));
                    t_far = t_far.min(t1.max(t2));
                }
                (t_near <= t_far && t_near >= 0.0).then_some(t_near)
            },
            ObstacleShape::Sphere { center, radius } => {
                let oc = origin - center;
                let b = oc.dot(dir);
                let c = oc.length_squared() - radius * radius;
                if c <= 0.0 {
                    return None;
                }
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let t = -b - disc.sqrt();
                (t >= 0.0).then_some(t)
            },
        }
    }
}

/// A piece of static geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Geometry
    pub shape: ObstacleShape,
    /// Collision layer
    pub layer: LayerMask,
}

impl Obstacle {
    /// Creates a wall box on the obstacle layer.
    #[must_use]
    pub fn wall(min: Vec3, max: Vec3) -> Self {
        Self {
            shape: ObstacleShape::Box {
                min: min.min(max),
                max: min.max(max),
            },
            layer: LayerMask::OBSTACLE,
        }
    }

    /// Creates a sphere on the obstacle layer.
    #[must_use]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            shape: ObstacleShape::Sphere { center, radius },
            layer: LayerMask::OBSTACLE,
        }
    }

    /// Moves the obstacle to another layer.
    #[must_use]
    pub const fn on_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }
}

/// Collection of static obstacles answering ray and sightline queries.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Creates an empty field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field from a list of obstacles.
    #[must_use]
    pub fn from_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Adds an obstacle and returns its index.
    pub fn add(&mut self, obstacle: Obstacle) -> usize {
        self.obstacles.push(obstacle);
        self.obstacles.len() - 1
    }

    /// Returns the obstacles.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Returns the number of obstacles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// Returns whether the field has no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Performs a raycast from origin in direction, up to max_dist.
    ///
    /// # Returns
    /// The nearest blocking hit, or None if nothing blocks within max_dist.
    #[must_use]
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_dist: f32,
        filter: SightFilter,
    ) -> Option<RayHit> {
        let dir = direction.try_normalize()?;

        self.obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| filter.blocks(obstacle.layer))
            .filter_map(|(index, obstacle)| {
                obstacle
                    .shape
                    .ray_entry(origin, dir)
                    .filter(|&t| t <= max_dist)
                    .map(|t| RayHit {
                        obstacle: index,
                        distance: t,
                        point: origin + dir * t,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl OcclusionQuery for ObstacleField {
    fn is_clear(&self, from: Vec3, to: Vec3, filter: SightFilter) -> bool {
        let delta = to - from;
        self.raycast(from, delta, delta.length(), filter).is_none()
    }
}
