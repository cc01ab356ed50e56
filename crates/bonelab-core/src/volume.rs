//! Volume - immutable greyscale scan
//!
//! `Volume` stores one `f32` intensity per voxel behind an `Arc`, so clones
//! are cheap and the same scan can be shared across bones and erosion runs
//! processed in parallel. No operation in bonelab mutates a `Volume`;
//! filters always return a new one.

use crate::bounds::Bounds3;
use crate::error::{Error, Result};
use crate::geometry::{Dims3, GridGeometry, Index3};
use std::sync::Arc;

/// Immutable 3D intensity volume
#[derive(Debug, Clone)]
pub struct Volume {
    geometry: GridGeometry,
    data: Arc<[f32]>,
}

impl Volume {
    /// Create a volume from raw intensities in raster order
    ///
    /// # Errors
    ///
    /// Returns `Error::DataLength` if the buffer does not match the grid.
    pub fn new(geometry: GridGeometry, data: Vec<f32>) -> Result<Self> {
        let expected = geometry.dims().len();
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            geometry,
            data: data.into(),
        })
    }

    /// Create a volume from native 16-bit scanner values
    pub fn from_i16(geometry: GridGeometry, data: &[i16]) -> Result<Self> {
        Self::new(geometry, data.iter().map(|&v| f32::from(v)).collect())
    }

    /// Create a volume with every voxel set to `value`
    pub fn filled(geometry: GridGeometry, value: f32) -> Self {
        Self {
            geometry,
            data: vec![value; geometry.dims().len()].into(),
        }
    }

    /// Create a volume by evaluating `f` at every voxel
    pub fn from_fn(geometry: GridGeometry, f: impl Fn(Index3) -> f32) -> Self {
        let dims = geometry.dims();
        let data: Vec<f32> = (0..dims.len()).map(|i| f(dims.coords(i))).collect();
        Self {
            geometry,
            data: data.into(),
        }
    }

    /// Physical placement
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Grid dimensions
    #[inline]
    pub fn dims(&self) -> Dims3 {
        self.geometry.dims()
    }

    /// Raw intensities in raster order
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Intensity at a coordinate, `None` if outside the grid
    #[inline]
    pub fn get(&self, p: Index3) -> Option<f32> {
        self.dims().checked_index(p).map(|i| self.data[i])
    }

    /// Minimum and maximum intensity
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Copy out a sub-volume; the copy keeps correct physical placement
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds do not fit inside the volume.
    pub fn crop(&self, bounds: &Bounds3) -> Result<Volume> {
        let dims = self.dims();
        if !bounds.fits(dims) {
            return Err(Error::InvalidParameter(format!(
                "crop bounds {}..{} exceed volume {}",
                bounds.min, bounds.max, dims
            )));
        }
        let geometry = self.geometry.sub_geometry(bounds.min, bounds.dims());
        Ok(Volume::from_fn(geometry, |p| {
            self.data[dims.index(bounds.to_global(p))]
        }))
    }

    /// Return a new volume with `f` applied to every intensity
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Volume {
        let data: Vec<f32> = self.data.iter().map(|&v| f(v)).collect();
        Volume {
            geometry: self.geometry,
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let geom = GridGeometry::with_dims(2, 2, 2).unwrap();
        assert!(Volume::new(geom, vec![0.0; 7]).is_err());
        assert!(Volume::new(geom, vec![0.0; 8]).is_ok());
    }

    #[test]
    fn test_clone_shares_data() {
        let geom = GridGeometry::with_dims(4, 4, 4).unwrap();
        let v = Volume::filled(geom, 3.0);
        let c = v.clone();
        assert!(std::ptr::eq(v.data().as_ptr(), c.data().as_ptr()));
    }

    #[test]
    fn test_crop_preserves_values_and_origin() {
        let geom = GridGeometry::with_dims(5, 5, 5).unwrap();
        let v = Volume::from_fn(geom, |p| (p.x + 10 * p.y + 100 * p.z) as f32);
        let b = Bounds3::new(Index3::new(1, 2, 3), Index3::new(3, 4, 4)).unwrap();
        let sub = v.crop(&b).unwrap();
        assert_eq!(sub.dims().as_tuple(), (3, 3, 2));
        assert_eq!(sub.get(Index3::new(0, 0, 0)), Some(321.0));
        assert_eq!(sub.geometry().origin(), geom.physical_point(b.min));
    }

    #[test]
    fn test_from_i16_and_min_max() {
        let geom = GridGeometry::with_dims(3, 1, 1).unwrap();
        let v = Volume::from_i16(geom, &[-5, 100, 7]).unwrap();
        assert_eq!(v.min_max(), (-5.0, 100.0));
    }
}
