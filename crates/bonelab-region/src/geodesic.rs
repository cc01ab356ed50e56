//! Geodesic label propagation
//!
//! Grows existing labels into unlabeled voxels of a mask, one breadth-first
//! layer at a time, so every reached voxel takes the label whose source is
//! nearest along paths inside the mask. Sources are queued in raster order,
//! which fixes the winner when two labels arrive in the same layer.

use crate::error::RegionResult;
use bonelab_core::{BinaryMask, Connectivity, Labelmap};
use std::collections::VecDeque;

/// Result of a propagation
#[derive(Debug, Clone)]
pub struct Propagation {
    /// Source labels plus every voxel they reached
    pub labels: Labelmap,
    /// Voxels of the mask that no label reached
    pub unreached: usize,
}

/// Propagate the labels of `seeds` through `within`
///
/// Labeled voxels of `seeds` keep their label whether or not they lie in
/// `within`. Unlabeled voxels of `within` receive the label of the
/// geodesically nearest source.
///
/// # Errors
///
/// Returns an error if `within` does not match the labelmap grid.
pub fn propagate_labels(
    seeds: &Labelmap,
    within: &BinaryMask,
    connectivity: Connectivity,
) -> RegionResult<Propagation> {
    let dims = seeds.dims();
    if within.dims() != dims {
        return Err(bonelab_core::Error::DimensionMismatch {
            expected: dims.as_tuple(),
            actual: within.dims().as_tuple(),
        }
        .into());
    }

    let mut out = seeds.clone();
    let allowed = within.data();
    let labels = out.data_mut();
    let mut queue: VecDeque<usize> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, &l)| (l != 0).then_some(i))
        .collect();

    while let Some(i) = queue.pop_front() {
        let label = labels[i];
        for j in dims.neighbors(i, connectivity) {
            if labels[j] == 0 && allowed[j] {
                labels[j] = label;
                queue.push_back(j);
            }
        }
    }

    let unreached = allowed
        .iter()
        .zip(labels.iter())
        .filter(|&(&a, &l)| a && l == 0)
        .count();
    Ok(Propagation {
        labels: out,
        unreached,
    })
}
