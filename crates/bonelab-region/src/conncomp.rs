//! Connected component analysis
//!
//! This module provides functions for finding and labeling connected
//! components in 3D masks and label buffers. It uses a Union-Find (disjoint
//! set) data structure: one raster pass joins each voxel with its
//! already-visited neighbors, a second pass assigns compact labels.
//!
//! Components are always numbered 1..n in raster order of their first
//! voxel, so labeling is deterministic.

use crate::error::{RegionError, RegionResult};
use bonelab_core::{BinaryMask, Bounds3, Connectivity, Dims3, GridGeometry, Labelmap};

/// A connected component in a volume
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    /// Unique label for this component
    pub label: u32,
    /// Input value the component was grown from (1 for binary masks)
    pub value: u32,
    /// Number of voxels in this component
    pub voxel_count: usize,
    /// Bounding box of this component
    pub bounds: Bounds3,
    /// Linear index of the first voxel in raster order
    pub first_index: usize,
}

/// Result of connected component labeling
#[derive(Debug, Clone)]
pub struct ComponentMap {
    dims: Dims3,
    labels: Vec<u32>,
    components: Vec<ConnectedComponent>,
}

impl ComponentMap {
    /// Grid dimensions
    pub fn dims(&self) -> Dims3 {
        self.dims
    }

    /// Component label per voxel (0 = background)
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Components, ordered by label
    pub fn components(&self) -> &[ConnectedComponent] {
        &self.components
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if no component was found
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component carrying `label`
    pub fn component(&self, label: u32) -> Option<&ConnectedComponent> {
        label
            .checked_sub(1)
            .and_then(|i| self.components.get(i as usize))
    }

    /// Mask of one component
    pub fn component_mask(&self, label: u32) -> RegionResult<BinaryMask> {
        let data = self.labels.iter().map(|&l| l == label).collect();
        Ok(BinaryMask::from_data(self.dims, data)?)
    }

    /// Place the component labels on a grid
    ///
    /// # Errors
    ///
    /// Returns an error if `geometry` does not match the labeled grid.
    pub fn into_labelmap(self, geometry: GridGeometry) -> RegionResult<Labelmap> {
        if geometry.dims() != self.dims {
            return Err(RegionError::InvalidParameters(format!(
                "geometry {} does not match components {}",
                geometry.dims(),
                self.dims
            )));
        }
        Ok(Labelmap::from_data(geometry, self.labels)?)
    }

    /// Build a map from a per-voxel label buffer and its component table
    pub(crate) fn from_parts(
        dims: Dims3,
        labels: Vec<u32>,
        components: Vec<ConnectedComponent>,
    ) -> Self {
        Self {
            dims,
            labels,
            components,
        }
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // keep the smaller index as root
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

/// Split a label buffer into connected components
///
/// Two neighboring voxels belong to the same component when they carry the
/// same non-zero value. A region of one value that falls apart into several
/// pieces therefore yields several components.
///
/// # Errors
///
/// Returns an error if `values` does not match `dims`.
pub fn label_by_value(
    dims: Dims3,
    values: &[u32],
    connectivity: Connectivity,
) -> RegionResult<ComponentMap> {
    if values.len() != dims.len() {
        return Err(bonelab_core::Error::DataLength {
            expected: dims.len(),
            actual: values.len(),
        }
        .into());
    }

    let mut parent: Vec<usize> = (0..values.len()).collect();
    for (i, &v) in values.iter().enumerate() {
        if v == 0 {
            continue;
        }
        for j in dims.neighbors(i, connectivity) {
            if j < i && values[j] == v {
                union(&mut parent, i, j);
            }
        }
    }

    // Roots are the smallest index of their set, so the first time a root
    // is seen is also the first raster voxel of its component.
    let mut root_label = vec![0u32; values.len()];
    let mut labels = vec![0u32; values.len()];
    let mut components: Vec<ConnectedComponent> = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        if v == 0 {
            continue;
        }
        let root = find(&mut parent, i);
        let p = dims.coords(i);
        if root_label[root] == 0 {
            let label = components.len() as u32 + 1;
            root_label[root] = label;
            components.push(ConnectedComponent {
                label,
                value: v,
                voxel_count: 0,
                bounds: Bounds3::from_point(p),
                first_index: i,
            });
        }
        let label = root_label[root];
        labels[i] = label;
        let comp = &mut components[label as usize - 1];
        comp.voxel_count += 1;
        comp.bounds.include(p);
    }

    Ok(ComponentMap {
        dims,
        labels,
        components,
    })
}

/// Label all connected components of a binary mask
pub fn label_connected_components(
    mask: &BinaryMask,
    connectivity: Connectivity,
) -> RegionResult<ComponentMap> {
    let values: Vec<u32> = mask.data().iter().map(|&v| u32::from(v)).collect();
    label_by_value(mask.dims(), &values, connectivity)
}

/// Find all connected components of a binary mask
///
/// Returns a vector of connected components, each with a label, voxel
/// count, and bounding box.
pub fn find_connected_components(
    mask: &BinaryMask,
    connectivity: Connectivity,
) -> RegionResult<Vec<ConnectedComponent>> {
    Ok(label_connected_components(mask, connectivity)?.components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonelab_core::Index3;

    fn dims(w: u32, h: u32, d: u32) -> Dims3 {
        Dims3::new(w, h, d).unwrap()
    }

    #[test]
    fn test_two_blobs() {
        let m = BinaryMask::from_fn(dims(10, 4, 4), |p| p.x < 3 || p.x > 6);
        let map = label_connected_components(&m, Connectivity::TwentySix).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.components()[0].voxel_count, 48);
        assert_eq!(map.components()[0].first_index, 0);
        assert_eq!(map.components()[1].bounds.min, Index3::new(7, 0, 0));
    }

    #[test]
    fn test_diagonal_connectivity() {
        let m = BinaryMask::from_fn(dims(3, 3, 3), |p| p.x == p.y && p.y == p.z);
        let six = find_connected_components(&m, Connectivity::Six).unwrap();
        let full = find_connected_components(&m, Connectivity::TwentySix).unwrap();
        assert_eq!(six.len(), 3);
        assert_eq!(full.len(), 1);
    }

    #[test]
    fn test_u_shape_merges() {
        // arms joined only at the far end: union-find must merge late
        let m = BinaryMask::from_fn(dims(5, 5, 1), |p| p.x == 0 || p.x == 4 || p.y == 4);
        let map = label_connected_components(&m, Connectivity::Six).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.labels().iter().all(|&l| l <= 1));
    }

    #[test]
    fn test_label_by_value_splits_labels() {
        let d = dims(4, 1, 1);
        let values = [1, 2, 0, 2];
        let map = label_by_value(d, &values, Connectivity::TwentySix).unwrap();
        assert_eq!(map.labels(), &[1, 2, 0, 3]);
        assert_eq!(map.component(3).unwrap().value, 2);
        assert!(label_by_value(d, &[1, 2], Connectivity::Six).is_err());
    }
}
