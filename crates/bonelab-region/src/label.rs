//! Voxel labeling functions
//!
//! This module provides high-level functions for ordering, filtering and
//! measuring labeled components.

use crate::conncomp::{ComponentMap, ConnectedComponent};
use bonelab_core::{Bounds3, Labelmap};
use std::collections::BTreeMap;

/// Renumber components by decreasing size, dropping small ones
///
/// Components with fewer than `min_size` voxels are removed. The rest are
/// numbered 1..n from largest to smallest; equal sizes keep raster order of
/// their first voxel.
///
/// # Arguments
///
/// * `map` - Labeled components
/// * `min_size` - Smallest component to keep, in voxels
///
/// # Returns
///
/// A new component map.
pub fn relabel_by_size(map: &ComponentMap, min_size: usize) -> ComponentMap {
    let mut kept: Vec<&ConnectedComponent> = map
        .components()
        .iter()
        .filter(|c| c.voxel_count >= min_size)
        .collect();
    kept.sort_by(|a, b| {
        b.voxel_count
            .cmp(&a.voxel_count)
            .then(a.first_index.cmp(&b.first_index))
    });

    let mut lookup = vec![0u32; map.len() + 1];
    let mut components = Vec::with_capacity(kept.len());
    for (new, comp) in (1u32..).zip(kept) {
        lookup[comp.label as usize] = new;
        components.push(ConnectedComponent {
            label: new,
            ..comp.clone()
        });
    }
    let labels = map.labels().iter().map(|&l| lookup[l as usize]).collect();
    ComponentMap::from_parts(map.dims(), labels, components)
}

/// Component statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentStats {
    /// Component label
    pub label: u32,
    /// Bounding box
    pub bounds: Bounds3,
    /// Number of voxels
    pub voxel_count: usize,
    /// Centroid in voxel coordinates (x, y, z)
    pub centroid: [f64; 3],
}

/// Get statistics for every label of a labelmap
///
/// # Returns
///
/// A vector of component statistics, sorted by label.
pub fn component_stats(labels: &Labelmap) -> Vec<ComponentStats> {
    struct Accum {
        count: usize,
        sum: [u64; 3],
        bounds: Bounds3,
    }

    let dims = labels.dims();
    let mut stats: BTreeMap<u32, Accum> = BTreeMap::new();
    for (i, &label) in labels.data().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let p = dims.coords(i);
        let acc = stats.entry(label).or_insert_with(|| Accum {
            count: 0,
            sum: [0; 3],
            bounds: Bounds3::from_point(p),
        });
        acc.count += 1;
        acc.sum[0] += u64::from(p.x);
        acc.sum[1] += u64::from(p.y);
        acc.sum[2] += u64::from(p.z);
        acc.bounds.include(p);
    }

    stats
        .into_iter()
        .map(|(label, acc)| {
            let n = acc.count as f64;
            ComponentStats {
                label,
                bounds: acc.bounds,
                voxel_count: acc.count,
                centroid: [
                    acc.sum[0] as f64 / n,
                    acc.sum[1] as f64 / n,
                    acc.sum[2] as f64 / n,
                ],
            }
        })
        .collect()
}
