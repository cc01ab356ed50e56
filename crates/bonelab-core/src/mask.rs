//! BinaryMask - 3D boolean voxel grid
//!
//! The binary counterpart of [`Volume`](crate::Volume) and
//! [`Labelmap`](crate::Labelmap). Masks carry dimensions only; physical
//! placement stays with the volume they were derived from.

use crate::bounds::Bounds3;
use crate::error::{Error, Result};
use crate::geometry::{Dims3, Index3};

/// 3D binary mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    dims: Dims3,
    data: Vec<bool>,
}

impl BinaryMask {
    /// Create an all-background mask
    pub fn new(dims: Dims3) -> Self {
        Self {
            dims,
            data: vec![false; dims.len()],
        }
    }

    /// Create a mask from raw data in raster order
    ///
    /// # Errors
    ///
    /// Returns `Error::DataLength` if the buffer does not match `dims`.
    pub fn from_data(dims: Dims3, data: Vec<bool>) -> Result<Self> {
        if data.len() != dims.len() {
            return Err(Error::DataLength {
                expected: dims.len(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Wrap a buffer already known to match `dims`
    pub(crate) fn from_raw(dims: Dims3, data: Vec<bool>) -> Self {
        debug_assert_eq!(data.len(), dims.len());
        Self { dims, data }
    }

    /// Create a mask by evaluating a predicate at every voxel
    pub fn from_fn(dims: Dims3, f: impl Fn(Index3) -> bool) -> Self {
        let data = (0..dims.len()).map(|i| f(dims.coords(i))).collect();
        Self { dims, data }
    }

    /// Grid dimensions
    #[inline]
    pub fn dims(&self) -> Dims3 {
        self.dims
    }

    /// Raw data in raster order
    #[inline]
    pub fn data(&self) -> &[bool] {
        &self.data
    }

    /// Mutable raw data in raster order
    #[inline]
    pub fn data_mut(&mut self) -> &mut [bool] {
        &mut self.data
    }

    /// Value at a coordinate, `None` if outside the grid
    #[inline]
    pub fn get(&self, p: Index3) -> Option<bool> {
        self.dims.checked_index(p).map(|i| self.data[i])
    }

    /// Set the value at a coordinate
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfGrid` if the coordinate is outside the grid.
    pub fn set(&mut self, p: Index3, value: bool) -> Result<()> {
        let i = self.dims.checked_index(p).ok_or(Error::OutOfGrid {
            x: i64::from(p.x),
            y: i64::from(p.y),
            z: i64::from(p.z),
        })?;
        self.data[i] = value;
        Ok(())
    }

    /// Number of foreground voxels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True if no voxel is set
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Linear indices of foreground voxels
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
    }

    fn check_same_dims(&self, other: &BinaryMask) -> Result<()> {
        if self.dims != other.dims {
            return Err(Error::DimensionMismatch {
                expected: self.dims.as_tuple(),
                actual: other.dims.as_tuple(),
            });
        }
        Ok(())
    }

    /// Voxel-wise intersection
    pub fn and(&self, other: &BinaryMask) -> Result<BinaryMask> {
        self.zip_with(other, |a, b| a && b)
    }

    /// Voxel-wise union
    pub fn or(&self, other: &BinaryMask) -> Result<BinaryMask> {
        self.zip_with(other, |a, b| a || b)
    }

    /// Voxels set in `self` but not in `other`
    pub fn and_not(&self, other: &BinaryMask) -> Result<BinaryMask> {
        self.zip_with(other, |a, b| a && !b)
    }

    fn zip_with(&self, other: &BinaryMask, f: impl Fn(bool, bool) -> bool) -> Result<BinaryMask> {
        self.check_same_dims(other)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(BinaryMask {
            dims: self.dims,
            data,
        })
    }

    /// Complement of the mask
    pub fn invert(&self) -> BinaryMask {
        BinaryMask {
            dims: self.dims,
            data: self.data.iter().map(|&v| !v).collect(),
        }
    }

    /// Bounding box of the foreground, `None` if empty
    pub fn bounds(&self) -> Option<Bounds3> {
        let mut bounds: Option<Bounds3> = None;
        for i in self.iter_set() {
            let p = self.dims.coords(i);
            match bounds.as_mut() {
                Some(b) => b.include(p),
                None => bounds = Some(Bounds3::from_point(p)),
            }
        }
        bounds
    }

    /// Copy out the region covered by `bounds`
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds do not fit inside the mask.
    pub fn crop(&self, bounds: &Bounds3) -> Result<BinaryMask> {
        if !bounds.fits(self.dims) {
            return Err(Error::InvalidParameter(format!(
                "crop bounds {}..{} exceed mask {}",
                bounds.min, bounds.max, self.dims
            )));
        }
        let sub = bounds.dims();
        Ok(BinaryMask::from_fn(sub, |p| {
            self.data[self.dims.index(bounds.to_global(p))]
        }))
    }

    /// Embed the mask in a larger background grid with `margin` voxels
    /// of padding on every side
    pub fn pad(&self, margin: u32) -> BinaryMask {
        let d = self.dims;
        let padded = Dims3::new_unchecked(
            d.width + 2 * margin,
            d.height + 2 * margin,
            d.depth + 2 * margin,
        );
        let mut out = BinaryMask::new(padded);
        for i in self.iter_set() {
            let p = d.coords(i);
            let q = Index3::new(p.x + margin, p.y + margin, p.z + margin);
            out.data[padded.index(q)] = true;
        }
        out
    }

    /// Remove `margin` voxels of padding from every side
    ///
    /// # Errors
    ///
    /// Returns an error if the mask is too small to unpad.
    pub fn unpad(&self, margin: u32) -> Result<BinaryMask> {
        let d = self.dims;
        let inner = Dims3::new(
            d.width.saturating_sub(2 * margin),
            d.height.saturating_sub(2 * margin),
            d.depth.saturating_sub(2 * margin),
        )?;
        let offset = Index3::new(margin, margin, margin);
        let bounds = Bounds3 {
            min: offset,
            max: Index3::new(
                margin + inner.width - 1,
                margin + inner.height - 1,
                margin + inner.depth - 1,
            ),
        };
        self.crop(&bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32, d: u32) -> Dims3 {
        Dims3::new(w, h, d).unwrap()
    }

    #[test]
    fn test_logical_ops() {
        let a = BinaryMask::from_fn(dims(4, 1, 1), |p| p.x < 2);
        let b = BinaryMask::from_fn(dims(4, 1, 1), |p| p.x % 2 == 0);
        assert_eq!(a.and(&b).unwrap().count(), 1);
        assert_eq!(a.or(&b).unwrap().count(), 3);
        assert_eq!(a.and_not(&b).unwrap().count(), 1);
        assert_eq!(a.invert().count(), 2);
    }

    #[test]
    fn test_dims_mismatch() {
        let a = BinaryMask::new(dims(4, 1, 1));
        let b = BinaryMask::new(dims(2, 2, 1));
        assert!(a.and(&b).is_err());
    }

    #[test]
    fn test_bounds() {
        let mut m = BinaryMask::new(dims(8, 8, 8));
        assert!(m.bounds().is_none());
        m.set(Index3::new(1, 2, 3), true).unwrap();
        m.set(Index3::new(4, 2, 5), true).unwrap();
        let b = m.bounds().unwrap();
        assert_eq!(b.min, Index3::new(1, 2, 3));
        assert_eq!(b.max, Index3::new(4, 2, 5));
    }

    #[test]
    fn test_pad_unpad() {
        let m = BinaryMask::from_fn(dims(3, 3, 3), |p| p.x == 1);
        let padded = m.pad(2);
        assert_eq!(padded.dims().as_tuple(), (7, 7, 7));
        assert_eq!(padded.count(), m.count());
        assert_eq!(padded.get(Index3::new(3, 2, 2)), Some(true));
        assert_eq!(padded.unpad(2).unwrap(), m);
    }
}
