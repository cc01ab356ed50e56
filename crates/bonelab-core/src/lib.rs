//! bonelab-core - Basic data structures for bone scan segmentation
//!
//! This crate provides the fundamental data structures shared by every
//! bonelab algorithm:
//!
//! - [`Volume`] - Immutable greyscale scan (shared, read-only)
//! - [`Labelmap`] - Mutable integer label grid (0 = background)
//! - [`BinaryMask`] - Boolean voxel grid used by intermediate steps
//! - [`GridGeometry`] / [`Dims3`] / [`Index3`] - Grid placement and indexing
//! - [`Bounds3`] - Inclusive voxel bounding boxes
//! - [`SeedPoint`] - User-placed growth origins
//!
//! # Example
//!
//! ```
//! use bonelab_core::{GridGeometry, Index3, Labelmap, Volume};
//!
//! let geometry = GridGeometry::with_dims(16, 16, 8).unwrap();
//! let volume = Volume::from_fn(geometry, |p| if p.x > 8 { 1000.0 } else { 0.0 });
//! assert_eq!(volume.get(Index3::new(9, 0, 0)), Some(1000.0));
//!
//! let mut labels = Labelmap::new(geometry);
//! labels.set(Index3::new(3, 3, 3), 1).unwrap();
//! assert_eq!(labels.labels(), vec![1]);
//! ```

pub mod bounds;
pub mod error;
pub mod geometry;
pub mod labelmap;
pub mod mask;
pub mod seed;
pub mod volume;

pub use bounds::Bounds3;
pub use error::{Error, Result};
pub use geometry::{Connectivity, DEFAULT_SPACING, Dims3, GridGeometry, Index3};
pub use labelmap::Labelmap;
pub use mask::BinaryMask;
pub use seed::SeedPoint;
pub use volume::Volume;
