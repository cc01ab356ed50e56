//! Global intensity thresholding
//!
//! Binarizes a volume against an inclusive `[lower, upper]` intensity
//! window. Scanner thresholds are integers, so the window is stored as
//! `i32` and compared against the `f32` intensities.

use crate::{FilterError, FilterResult};
use bonelab_core::{BinaryMask, Volume};

/// Inclusive intensity window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRange {
    /// Lowest accepted intensity
    pub lower: i32,
    /// Highest accepted intensity
    pub upper: i32,
}

impl ThresholdRange {
    /// Create a window
    ///
    /// # Errors
    ///
    /// Returns an error if `lower > upper`.
    pub fn new(lower: i32, upper: i32) -> FilterResult<Self> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    /// Check that `lower <= upper`
    pub fn validate(&self) -> FilterResult<()> {
        if self.lower > self.upper {
            return Err(FilterError::InvalidParameters(format!(
                "lower threshold {} exceeds upper threshold {}",
                self.lower, self.upper
            )));
        }
        Ok(())
    }

    /// Whether an intensity falls inside the window
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.lower as f32 && value <= self.upper as f32
    }
}

/// Binarize a volume: voxels inside `range` are set
pub fn threshold(volume: &Volume, range: ThresholdRange) -> FilterResult<BinaryMask> {
    range.validate()?;
    let data = volume.data().iter().map(|&v| range.contains(v)).collect();
    Ok(BinaryMask::from_data(volume.dims(), data)?)
}
