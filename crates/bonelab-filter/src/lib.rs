//! bonelab-filter - Intensity filters for bone scans
//!
//! This crate provides the voxel-wise and separable filters the
//! segmentation stages are built from:
//!
//! - **Thresholding** - Inclusive `[lower, upper]` binarization
//! - **Gaussian smoothing** - Separable 3D smoothing of volumes and masks
//! - **Distance transform** - Exact squared Euclidean distance maps
//! - **Running statistics** - Streaming mean / standard deviation
//!
//! # Example
//!
//! ```
//! use bonelab_core::{GridGeometry, Volume};
//! use bonelab_filter::{ThresholdRange, threshold};
//!
//! let geometry = GridGeometry::with_dims(8, 8, 8).unwrap();
//! let volume = Volume::from_fn(geometry, |p| if p.z < 4 { 900.0 } else { 50.0 });
//! let mask = threshold(&volume, ThresholdRange::new(200, 1200).unwrap()).unwrap();
//! assert_eq!(mask.count(), 8 * 8 * 4);
//! ```

pub mod distance;
mod error;
pub mod gaussian;
pub mod stats;
pub mod threshold;

pub use distance::{DistanceMap, squared_distance};
pub use error::{FilterError, FilterResult};
pub use gaussian::{GaussianKernel, gaussian_smooth, smooth_mask};
pub use stats::RunningStats;
pub use threshold::{ThresholdRange, threshold};
