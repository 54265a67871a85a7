//! Collision layer masks used to classify obstacles and targets.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

/// Bit set of collision layers (32 layers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// Default layer for untagged geometry.
    pub const DEFAULT: Self = Self(1);
    /// Layer for vision-blocking walls.
    pub const OBSTACLE: Self = Self(1 << 6);
    /// Layer for the tracked player/target.
    pub const TARGET: Self = Self(1 << 7);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Creates a mask containing a single layer index (0..32).
    ///
    /// Indices outside the range produce an empty mask.
    #[must_use]
    pub const fn layer(index: u32) -> Self {
        if index < 32 {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks whether the two masks share any layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether the mask is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for LayerMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for LayerMask {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}
