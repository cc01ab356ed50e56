//! bonelab-region - Region processing for bonelab
//!
//! This crate provides region processing functionality including:
//!
//! - **Connected component analysis** - Finding and labeling connected regions
//! - **Seed fill operations** - Reconstruction and hole filling
//! - **Geodesic propagation** - Growing labels through a mask
//! - **Labeling** - Size ordering and per-label statistics
//!
//! # Examples
//!
//! ## Finding connected components
//!
//! ```
//! use bonelab_core::{BinaryMask, Connectivity, Dims3};
//! use bonelab_region::find_connected_components;
//!
//! let dims = Dims3::new(10, 10, 10).unwrap();
//! let mask = BinaryMask::from_fn(dims, |p| p.x < 2 || p.x > 7);
//! let components = find_connected_components(&mask, Connectivity::TwentySix).unwrap();
//! assert_eq!(components.len(), 2);
//! ```
//!
//! ## Hole filling
//!
//! ```
//! use bonelab_core::{BinaryMask, Connectivity, Dims3};
//! use bonelab_region::{SeedFillOptions, fill_holes};
//!
//! let dims = Dims3::new(5, 5, 5).unwrap();
//! let shell = BinaryMask::from_fn(dims, |p| p != bonelab_core::Index3::new(2, 2, 2));
//! let filled = fill_holes(&shell, &SeedFillOptions::new(Connectivity::Six)).unwrap();
//! assert_eq!(filled.count(), 125);
//! ```

pub mod conncomp;
pub mod error;
pub mod geodesic;
pub mod label;
pub mod seedfill;

// Re-export error types
pub use error::{RegionError, RegionResult};

// Re-export conncomp types and functions
pub use conncomp::{
    ComponentMap, ConnectedComponent, find_connected_components, label_by_value,
    label_connected_components,
};

// Re-export label types and functions
pub use label::{ComponentStats, component_stats, relabel_by_size};

// Re-export seedfill types and functions
pub use seedfill::{SeedFillOptions, fill_holes, seedfill_binary, seedfill_points};

// Re-export geodesic propagation
pub use geodesic::{Propagation, propagate_labels};
