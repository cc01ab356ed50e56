//! Seed points for erosion segmentation
//!
//! A seed carries a voxel coordinate and the identifier the placement UI
//! assigned to it. The identifier is bookkeeping only: segmentation treats
//! the seeds of one run as an unordered set of growth origins.

use crate::error::Result;
use crate::geometry::{GridGeometry, Index3};

/// A user-placed growth origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedPoint {
    /// Identifier assigned by the caller (insertion order in the UI)
    pub id: u32,
    /// Voxel coordinate
    pub position: Index3,
}

impl SeedPoint {
    /// Create a seed from voxel coordinates
    pub const fn new(id: u32, x: u32, y: u32, z: u32) -> Self {
        Self {
            id,
            position: Index3::new(x, y, z),
        }
    }

    /// Create a seed from a physical point, snapped to the nearest voxel
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfGrid` if the point falls outside the grid.
    pub fn from_physical(id: u32, point: [f64; 3], geometry: &GridGeometry) -> Result<Self> {
        Ok(Self {
            id,
            position: geometry.index_of_point(point)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dims3;

    #[test]
    fn test_from_physical() {
        let geom = GridGeometry::new(Dims3::new(10, 10, 10).unwrap(), 0.1, [0.0; 3]).unwrap();
        let seed = SeedPoint::from_physical(4, [0.21, 0.5, 0.89], &geom).unwrap();
        assert_eq!(seed.position, Index3::new(2, 5, 9));
        assert_eq!(seed.id, 4);
        assert!(SeedPoint::from_physical(1, [2.0, 0.0, 0.0], &geom).is_err());
    }

}
