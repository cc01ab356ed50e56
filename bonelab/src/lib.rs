//! Bonelab - Bone contour and erosion segmentation for Rust
//!
//! Segments bones and the cortical erosions inside them from 3D intensity
//! scans.
//!
//! # Overview
//!
//! The workflow runs in four stages:
//!
//! - Bone separation (thresholding, connected components, painted maps)
//! - Periosteal contour extraction (smoothing, ball closing, hole filling)
//! - Seeded erosion segmentation (core compartment, adaptive growth)
//! - Priority-based combination of erosion runs and manual corrections
//!
//! The building blocks (Gaussian smoothing, exact distance transforms, ball
//! morphology, connected components, seed filling) are usable on their own.
//!
//! # Example
//!
//! ```
//! use bonelab::{GridGeometry, Index3, Volume};
//! use bonelab::filter::ThresholdRange;
//! use bonelab::segment::{ContourOptions, extract_contours};
//!
//! let geom = GridGeometry::with_dims(16, 16, 4).unwrap();
//! let volume = Volume::from_fn(geom, |p| {
//!     let dx = f64::from(p.x) - 8.0;
//!     let dy = f64::from(p.y) - 8.0;
//!     let r2 = dx * dx + dy * dy;
//!     if r2 > 4.0 && r2 <= 25.0 { 800.0 } else { 0.0 }
//! });
//! let options = ContourOptions::new()
//!     .with_thresholds(ThresholdRange::new(200, 1200).unwrap())
//!     .with_closing_radius(2)
//!     .with_sigma(0.0);
//! let set = extract_contours(&volume, &options, None).unwrap();
//! // the marrow cavity belongs to the contour
//! assert_eq!(set.contour.get(Index3::new(8, 8, 2)), Some(1));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use bonelab_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use bonelab_filter as filter;
pub use bonelab_morph as morph;
pub use bonelab_region as region;
pub use bonelab_segment as segment;
