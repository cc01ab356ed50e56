//! Error and warning types for bonelab-segment
//!
//! Errors abort only the bone, run or seed they name. Warnings never abort
//! anything: they travel with the result that produced them and are logged
//! once when raised.

use bonelab_core::{Dims3, Index3};
use thiserror::Error;

/// Errors that can occur during segmentation
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] bonelab_core::Error),

    /// Filter error
    #[error("filter error: {0}")]
    Filter(#[from] bonelab_filter::FilterError),

    /// Region processing error
    #[error("region error: {0}")]
    Region(#[from] bonelab_region::RegionError),

    /// No voxel passed the thresholds (bone 0 = whole volume)
    #[error("no voxels within thresholds for bone {bone}")]
    ThresholdEmpty { bone: u32 },

    /// Seed is not inside the contour of the bone being segmented
    #[error("seed {seed_id} at {position} lies outside the contour of bone {bone}")]
    SeedOutsideContour {
        seed_id: u32,
        position: Index3,
        bone: u32,
    },

    /// Seed is not inside the volume
    #[error("seed {seed_id} at {position} lies outside the {dims} volume")]
    SeedOutOfBounds {
        seed_id: u32,
        position: Index3,
        dims: Dims3,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The run was cancelled before it committed
    #[error("erosion run {run_id} was cancelled")]
    Cancelled { run_id: u32 },
}

/// Result type for segmentation operations
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Non-fatal conditions reported alongside a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentWarning {
    /// Discovered bone count differs from the configured one
    #[error("requested {requested} bone(s), found {found}")]
    BoneCountMismatch { requested: u32, found: u32 },

    /// A region hit the growth layer or radius cap
    #[error("run {run_id}: region {label} (seeds {seed_ids:?}) hit the growth cap")]
    GrowthTimeout {
        run_id: u32,
        label: u32,
        seed_ids: Vec<u32>,
    },

    /// The combiner gave contested voxels to the higher-priority run
    #[error("{voxels} contested voxel(s) kept by run {winner} over run {loser}")]
    OverlapResolved {
        winner: u32,
        loser: u32,
        voxels: usize,
    },

    /// A bone had no voxels to build a contour from
    #[error("bone {bone} has an empty contour")]
    EmptyContour { bone: u32 },
}

impl SegmentWarning {
    /// Log the warning and hand it back
    pub(crate) fn raise(self) -> Self {
        log::warn!("{self}");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_messages() {
        let w = SegmentWarning::OverlapResolved {
            winner: 2,
            loser: 5,
            voxels: 5,
        };
        assert_eq!(w.to_string(), "5 contested voxel(s) kept by run 2 over run 5");
        let w = SegmentWarning::GrowthTimeout {
            run_id: 1,
            label: 3,
            seed_ids: vec![4, 7],
        };
        assert_eq!(w.to_string(), "run 1: region 3 (seeds [4, 7]) hit the growth cap");
    }
}
