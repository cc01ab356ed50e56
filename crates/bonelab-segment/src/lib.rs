//! bonelab-segment - Bone separation, contour extraction and erosion
//! segmentation
//!
//! The stages of the workflow, each a pure function of its inputs:
//!
//! - **Separation**: [`separate_bones`] partitions thresholded voxels into
//!   bones
//! - **Contours**: [`extract_contours`] builds one solid periosteal envelope
//!   per bone
//! - **Erosions**: [`segment_erosions`] grows seeded cortical breaks inside
//!   one bone's contour; [`run_erosion_jobs`] runs many such jobs in parallel
//! - **Combination**: [`combine_erosions`] merges runs and manual
//!   corrections by priority
//!
//! Failures that only concern one bone, run or seed are reported as
//! [`SegmentError`]s; conditions worth knowing about but not fatal travel
//! with each result as [`SegmentWarning`]s.
//!
//! # Example
//!
//! ```
//! use bonelab_core::{GridGeometry, Volume};
//! use bonelab_filter::ThresholdRange;
//! use bonelab_segment::{SeparationOptions, separate_bones};
//!
//! let geom = GridGeometry::with_dims(8, 8, 8).unwrap();
//! let volume = Volume::from_fn(geom, |p| if p.x < 4 { 900.0 } else { 0.0 });
//! let options = SeparationOptions::new()
//!     .with_thresholds(ThresholdRange::new(200, 1200).unwrap());
//! let bones = separate_bones(&volume, &options, None).unwrap();
//! assert_eq!(bones.bone_count(), 1);
//! ```

pub mod cancel;
pub mod combiner;
pub mod contour;
pub mod erosion;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod separator;

pub use cancel::CancelToken;
pub use combiner::{CombinedErosionSet, ErosionLayer, LabelOrigin, combine_erosions};
pub use contour::{ContourSet, extract_bone_contour, extract_contours};
pub use erosion::{ErosionRegion, ErosionRun, segment_erosions};
pub use error::{SegmentError, SegmentResult, SegmentWarning};
pub use options::{
    AdvancedParameters, CONTOUR_THRESHOLDS, ContourOptions, DEFAULT_MIN_COMPONENT_SIZE,
    EROSION_THRESHOLDS, ErosionOptions, FillMode, GrowthPreset, SeparationOptions, SizeMode,
};
pub use pipeline::{ErosionJob, run_erosion_jobs};
pub use separator::{BoneRecord, BoneSeparation, separate_bones};
