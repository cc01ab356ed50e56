//! bonelab-morph - Morphological operations for 3D binary masks
//!
//! This crate provides ball morphology (erosion, dilation, opening,
//! closing) backed by an exact Euclidean distance transform, so large radii
//! cost no more than small ones.

pub mod binary;

pub use binary::{close_ball, dilate_ball, erode_ball, open_ball};
