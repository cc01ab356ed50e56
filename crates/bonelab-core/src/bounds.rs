//! Bounds3 - Axis-aligned voxel bounding boxes
//!
//! Unlike a physical-space box, `Bounds3` is an inclusive range of voxel
//! indices. It is a small `Copy` type.

use crate::error::{Error, Result};
use crate::geometry::{Dims3, Index3};

/// Inclusive voxel bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds3 {
    /// Smallest corner (inclusive)
    pub min: Index3,
    /// Largest corner (inclusive)
    pub max: Index3,
}

impl Bounds3 {
    /// Create a bounding box
    ///
    /// # Errors
    ///
    /// Returns an error if `min` exceeds `max` along any axis.
    pub fn new(min: Index3, max: Index3) -> Result<Self> {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            return Err(Error::InvalidParameter(format!(
                "bounds min {} exceeds max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Bounding box of a single voxel
    pub const fn from_point(p: Index3) -> Self {
        Self { min: p, max: p }
    }

    /// Bounding box covering a whole grid
    pub fn full(dims: Dims3) -> Self {
        Self {
            min: Index3::new(0, 0, 0),
            max: Index3::new(dims.width - 1, dims.height - 1, dims.depth - 1),
        }
    }

    /// Grow to include a voxel
    pub fn include(&mut self, p: Index3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        let mut out = *self;
        out.include(other.min);
        out.include(other.max);
        out
    }

    /// Expand by `margin` voxels on every side, clamped to `dims`
    pub fn expand(&self, margin: u32, dims: Dims3) -> Bounds3 {
        Bounds3 {
            min: Index3::new(
                self.min.x.saturating_sub(margin),
                self.min.y.saturating_sub(margin),
                self.min.z.saturating_sub(margin),
            ),
            max: Index3::new(
                self.max.x.saturating_add(margin).min(dims.width - 1),
                self.max.y.saturating_add(margin).min(dims.height - 1),
                self.max.z.saturating_add(margin).min(dims.depth - 1),
            ),
        }
    }

    /// Whether a voxel lies inside the box
    #[inline]
    pub fn contains(&self, p: Index3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Whether the box fits inside a grid
    pub fn fits(&self, dims: Dims3) -> bool {
        dims.contains(self.max)
    }

    /// Extent of the box
    pub fn dims(&self) -> Dims3 {
        Dims3::new_unchecked(
            self.max.x - self.min.x + 1,
            self.max.y - self.min.y + 1,
            self.max.z - self.min.z + 1,
        )
    }

    /// Number of voxels covered
    pub fn voxel_count(&self) -> usize {
        self.dims().len()
    }

    /// Translate a coordinate from the enclosing grid into box-local space
    ///
    /// Returns `None` if the voxel is outside the box.
    pub fn to_local(&self, p: Index3) -> Option<Index3> {
        self.contains(p)
            .then(|| Index3::new(p.x - self.min.x, p.y - self.min.y, p.z - self.min.z))
    }

    /// Translate a box-local coordinate back into the enclosing grid
    pub fn to_global(&self, p: Index3) -> Index3 {
        Index3::new(p.x + self.min.x, p.y + self.min.y, p.z + self.min.z)
    }
}
