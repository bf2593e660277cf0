//! Axis-aligned bounding boxes for sprite-backed entities.
//!
//! Boxes are built from the truncated pixel position and the sprite extent,
//! and are half-open: a box at `x` with width `w` covers `x..x + w`. Two boxes
//! that only share an edge do not intersect.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Width and height in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    /// Footprint of an entity with no sprite.
    pub const POINT: Extent = Extent {
        width: 1,
        height: 1,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Half-open rectangle `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Aabb {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Aabb {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering `entity`'s extent at its pixel position.
    pub fn of(entity: &dyn Entity) -> Self {
        let (x, y) = entity.kinematics().pixel();
        let extent = entity.extent();
        Self::new(x, y, extent.width, extent.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlap test. Symmetric; empty boxes intersect nothing.
    pub fn intersects(&self, other: &Aabb) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        // Widen to i64 so x + width cannot overflow.
        let (ax, ay) = (i64::from(self.x), i64::from(self.y));
        let (bx, by) = (i64::from(other.x), i64::from(other.y));
        ax < bx + i64::from(other.width)
            && bx < ax + i64::from(self.width)
            && ay < by + i64::from(other.height)
            && by < ay + i64::from(self.height)
    }
}

/// The overlap test bounded entities use for
/// [`Entity::collides_with`].
pub fn overlaps(a: &dyn Entity, b: &dyn Entity) -> bool {
    Aabb::of(a).intersects(&Aabb::of(b))
}
