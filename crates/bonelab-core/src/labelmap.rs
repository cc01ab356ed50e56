//! Labelmap - mutable 3D integer label grid
//!
//! Label 0 is background; every positive label denotes one object (a bone
//! or an erosion). A labelmap shares grid dimensions and placement with the
//! volume it was derived from, and each voxel carries exactly one label.

use crate::bounds::Bounds3;
use crate::error::{Error, Result};
use crate::geometry::{Dims3, GridGeometry, Index3};
use crate::mask::BinaryMask;
use std::collections::BTreeMap;

/// Mutable 3D label volume
#[derive(Debug, Clone, PartialEq)]
pub struct Labelmap {
    geometry: GridGeometry,
    data: Vec<u32>,
}

impl Labelmap {
    /// Create an all-background labelmap
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            data: vec![0; geometry.dims().len()],
        }
    }

    /// Create a labelmap from raw labels in raster order
    ///
    /// # Errors
    ///
    /// Returns `Error::DataLength` if the buffer does not match the grid.
    pub fn from_data(geometry: GridGeometry, data: Vec<u32>) -> Result<Self> {
        let expected = geometry.dims().len();
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    /// Labelmap with `label` wherever `mask` is set
    ///
    /// # Errors
    ///
    /// Returns an error if the mask does not match the grid.
    pub fn from_mask(geometry: GridGeometry, mask: &BinaryMask, label: u32) -> Result<Self> {
        if mask.dims() != geometry.dims() {
            return Err(Error::DimensionMismatch {
                expected: geometry.dims().as_tuple(),
                actual: mask.dims().as_tuple(),
            });
        }
        let data = mask
            .data()
            .iter()
            .map(|&v| if v { label } else { 0 })
            .collect();
        Ok(Self { geometry, data })
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

    /// Raw labels in raster order
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Mutable raw labels in raster order
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Label at a coordinate, `None` if outside the grid
    #[inline]
    pub fn get(&self, p: Index3) -> Option<u32> {
        self.dims().checked_index(p).map(|i| self.data[i])
    }

    /// Set the label at a coordinate
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfGrid` if the coordinate is outside the grid.
    pub fn set(&mut self, p: Index3, label: u32) -> Result<()> {
        let i = self.dims().checked_index(p).ok_or(Error::OutOfGrid {
            x: i64::from(p.x),
            y: i64::from(p.y),
            z: i64::from(p.z),
        })?;
        self.data[i] = label;
        Ok(())
    }

    /// Sorted distinct positive labels
    pub fn labels(&self) -> Vec<u32> {
        self.voxel_counts().into_keys().collect()
    }

    /// Largest label present (0 if empty)
    pub fn max_label(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// True if every voxel is background
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&l| l == 0)
    }

    /// Number of voxels carrying `label`
    pub fn voxel_count(&self, label: u32) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }

    /// Number of labeled (non-background) voxels
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&l| l != 0).count()
    }

    /// Voxel count per positive label
    pub fn voxel_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for &l in self.data.iter().filter(|&&l| l != 0) {
            *counts.entry(l).or_insert(0) += 1;
        }
        counts
    }

    /// Bounding box of a label, `None` if absent
    pub fn bounds_of(&self, label: u32) -> Option<Bounds3> {
        let dims = self.dims();
        let mut bounds: Option<Bounds3> = None;
        for (i, _) in self.data.iter().enumerate().filter(|&(_, &l)| l == label) {
            let p = dims.coords(i);
            match bounds.as_mut() {
                Some(b) => b.include(p),
                None => bounds = Some(Bounds3::from_point(p)),
            }
        }
        bounds
    }

    /// Binary mask of one label
    pub fn mask_of(&self, label: u32) -> BinaryMask {
        let data = self.data.iter().map(|&l| l == label).collect();
        BinaryMask::from_raw(self.dims(), data)
    }

    /// Binary mask of all labeled voxels
    pub fn foreground_mask(&self) -> BinaryMask {
        let data = self.data.iter().map(|&l| l != 0).collect();
        BinaryMask::from_raw(self.dims(), data)
    }

    /// Copy out the region covered by `bounds`
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds do not fit inside the labelmap.
    pub fn crop(&self, bounds: &Bounds3) -> Result<Labelmap> {
        let dims = self.dims();
        if !bounds.fits(dims) {
            return Err(Error::InvalidParameter(format!(
                "crop bounds {}..{} exceed labelmap {}",
                bounds.min, bounds.max, dims
            )));
        }
        let sub_dims = bounds.dims();
        let data = (0..sub_dims.len())
            .map(|i| self.data[dims.index(bounds.to_global(sub_dims.coords(i)))])
            .collect();
        Ok(Labelmap {
            geometry: self.geometry.sub_geometry(bounds.min, sub_dims),
            data,
        })
    }

    /// Write the non-zero voxels of `sub` into this labelmap at `offset`
    ///
    /// Background voxels of `sub` leave existing labels untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `sub` does not fit at `offset`.
    pub fn paste(&mut self, sub: &Labelmap, offset: Index3) -> Result<()> {
        let dims = self.dims();
        let sd = sub.dims();
        let far = Index3::new(
            offset.x + sd.width - 1,
            offset.y + sd.height - 1,
            offset.z + sd.depth - 1,
        );
        if !dims.contains(far) {
            return Err(Error::InvalidParameter(format!(
                "paste of {} at {} exceeds labelmap {}",
                sd, offset, dims
            )));
        }
        for (i, &l) in sub.data.iter().enumerate().filter(|&(_, &l)| l != 0) {
            let p = sd.coords(i);
            let q = Index3::new(p.x + offset.x, p.y + offset.y, p.z + offset.z);
            self.data[dims.index(q)] = l;
        }
        Ok(())
    }

    /// Replace labels according to `mapping`; unmapped labels are kept
    pub fn relabel(&mut self, mapping: &BTreeMap<u32, u32>) {
        for l in self.data.iter_mut() {
            if let Some(&to) = mapping.get(l) {
                *l = to;
            }
        }
    }

    /// Set every voxel in `mask` to `label`
    ///
    /// # Errors
    ///
    /// Returns an error if the mask does not match the grid.
    pub fn fill_mask(&mut self, mask: &BinaryMask, label: u32) -> Result<()> {
        if mask.dims() != self.dims() {
            return Err(Error::DimensionMismatch {
                expected: self.dims().as_tuple(),
                actual: mask.dims().as_tuple(),
            });
        }
        for i in mask.iter_set() {
            self.data[i] = label;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(w: u32, h: u32, d: u32) -> GridGeometry {
        GridGeometry::with_dims(w, h, d).unwrap()
    }

    #[test]
    fn test_counts_and_labels() {
        let mut lm = Labelmap::new(geom(4, 4, 4));
        lm.set(Index3::new(0, 0, 0), 3).unwrap();
        lm.set(Index3::new(1, 0, 0), 3).unwrap();
        lm.set(Index3::new(2, 2, 2), 1).unwrap();
        assert_eq!(lm.labels(), vec![1, 3]);
        assert_eq!(lm.voxel_count(3), 2);
        assert_eq!(lm.max_label(), 3);
        assert_eq!(lm.foreground_count(), 3);
        assert!(lm.set(Index3::new(4, 0, 0), 1).is_err());
    }

    #[test]
    fn test_crop_and_paste() {
        let mut lm = Labelmap::new(geom(6, 6, 6));
        lm.set(Index3::new(3, 3, 3), 7).unwrap();
        let b = Bounds3::new(Index3::new(2, 2, 2), Index3::new(4, 4, 4)).unwrap();
        let sub = lm.crop(&b).unwrap();
        assert_eq!(sub.get(Index3::new(1, 1, 1)), Some(7));

        let mut target = Labelmap::new(geom(6, 6, 6));
        target.set(Index3::new(2, 2, 2), 9).unwrap();
        target.paste(&sub, b.min).unwrap();
        assert_eq!(target.get(Index3::new(3, 3, 3)), Some(7));
        // background in `sub` does not erase existing labels
        assert_eq!(target.get(Index3::new(2, 2, 2)), Some(9));
    }

    #[test]
    fn test_relabel_and_bounds() {
        let mut lm = Labelmap::new(geom(5, 5, 5));
        lm.set(Index3::new(1, 1, 1), 4).unwrap();
        lm.set(Index3::new(3, 2, 1), 4).unwrap();
        let b = lm.bounds_of(4).unwrap();
        assert_eq!(b.min, Index3::new(1, 1, 1));
        assert_eq!(b.max, Index3::new(3, 2, 1));

        let mapping = BTreeMap::from([(4, 1)]);
        lm.relabel(&mapping);
        assert_eq!(lm.labels(), vec![1]);
        assert!(lm.bounds_of(4).is_none());
    }
}
