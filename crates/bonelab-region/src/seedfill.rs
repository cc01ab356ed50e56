//! Seed fill operations
//!
//! This module provides seed fill algorithms for 3D binary masks. These
//! are used for hole filling and morphological reconstruction.

use crate::error::{RegionError, RegionResult};
use bonelab_core::{BinaryMask, Connectivity, Dims3, Index3};
use std::collections::VecDeque;

/// Options for seed fill operations
#[derive(Debug, Clone)]
pub struct SeedFillOptions {
    /// Connectivity used while spreading
    pub connectivity: Connectivity,
    /// Restrict spreading to the axial (xy) plane of each seed
    pub slice_wise: bool,
}

impl Default for SeedFillOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::TwentySix,
            slice_wise: false,
        }
    }
}

impl SeedFillOptions {
    /// Create new options with the specified connectivity
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }

    /// Spread within axial slices only
    pub fn with_slice_wise(mut self, slice_wise: bool) -> Self {
        self.slice_wise = slice_wise;
        self
    }

    fn offsets(&self) -> Vec<(i64, i64, i64)> {
        self.connectivity
            .offsets()
            .iter()
            .copied()
            .filter(|&(_, _, dz)| !self.slice_wise || dz == 0)
            .collect()
    }
}

/// Breadth-first spread from queued voxels into voxels accepted by `open`
fn spread(
    dims: Dims3,
    queue: &mut VecDeque<usize>,
    visited: &mut [bool],
    offsets: &[(i64, i64, i64)],
    open: impl Fn(usize) -> bool,
) {
    while let Some(i) = queue.pop_front() {
        let p = dims.coords(i);
        for &(dx, dy, dz) in offsets {
            let Some(j) = p.offset(dx, dy, dz).and_then(|q| dims.checked_index(q)) else {
                continue;
            };
            if !visited[j] && open(j) {
                visited[j] = true;
                queue.push_back(j);
            }
        }
    }
}

/// Binary reconstruction: every voxel of `clip` connected to a seed voxel
///
/// Seeds outside `clip` still start the spread but are not part of the
/// result, which is always a subset of `clip`.
///
/// # Errors
///
/// Returns an error if the two masks differ in size.
pub fn seedfill_binary(
    seeds: &BinaryMask,
    clip: &BinaryMask,
    options: &SeedFillOptions,
) -> RegionResult<BinaryMask> {
    let dims = clip.dims();
    if seeds.dims() != dims {
        return Err(bonelab_core::Error::DimensionMismatch {
            expected: dims.as_tuple(),
            actual: seeds.dims().as_tuple(),
        }
        .into());
    }

    let mut visited = vec![false; dims.len()];
    let mut queue = VecDeque::new();
    for i in seeds.iter_set() {
        visited[i] = true;
        queue.push_back(i);
    }
    let allowed = clip.data();
    spread(dims, &mut queue, &mut visited, &options.offsets(), |j| {
        allowed[j]
    });

    let data = visited
        .iter()
        .zip(allowed.iter())
        .map(|(&v, &c)| v && c)
        .collect();
    Ok(BinaryMask::from_data(dims, data)?)
}

/// Binary reconstruction from seed points
///
/// # Errors
///
/// Returns an error if a point lies outside the mask.
pub fn seedfill_points(
    points: &[Index3],
    clip: &BinaryMask,
    options: &SeedFillOptions,
) -> RegionResult<BinaryMask> {
    let mut seeds = BinaryMask::new(clip.dims());
    for &p in points {
        seeds.set(p, true).map_err(|_| RegionError::InvalidSeed {
            x: p.x,
            y: p.y,
            z: p.z,
        })?;
    }
    seedfill_binary(&seeds, clip, options)
}

/// Fill enclosed cavities of a mask
///
/// Background voxels that cannot reach the grid border through background
/// are set. `options.connectivity` is the connectivity of the *background*;
/// with `slice_wise` each axial slice is filled on its own from the slice
/// border.
pub fn fill_holes(mask: &BinaryMask, options: &SeedFillOptions) -> RegionResult<BinaryMask> {
    let dims = mask.dims();
    let data = mask.data();
    let mut visited = vec![false; dims.len()];
    let mut queue = VecDeque::new();
    for (i, &v) in data.iter().enumerate() {
        if v {
            continue;
        }
        let p = dims.coords(i);
        let on_border = if options.slice_wise {
            p.x == 0 || p.y == 0 || p.x + 1 == dims.width || p.y + 1 == dims.height
        } else {
            dims.on_border(p)
        };
        if on_border {
            visited[i] = true;
            queue.push_back(i);
        }
    }
    spread(dims, &mut queue, &mut visited, &options.offsets(), |j| {
        !data[j]
    });

    // outside background = visited; everything else is foreground or a hole
    let filled = visited.iter().map(|&v| !v).collect();
    Ok(BinaryMask::from_data(dims, filled)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow_cube(size: u32) -> BinaryMask {
        let dims = Dims3::new(size, size, size).unwrap();
        let last = size - 2;
        BinaryMask::from_fn(dims, |p| {
            let inside = |v: u32| (1..=last).contains(&v);
            let shell = |v: u32| v == 1 || v == last;
            inside(p.x) && inside(p.y) && inside(p.z) && (shell(p.x) || shell(p.y) || shell(p.z))
        })
    }

    #[test]
    fn test_fill_holes_3d() {
        let m = hollow_cube(7);
        let filled = fill_holes(&m, &SeedFillOptions::new(Connectivity::Six)).unwrap();
        assert_eq!(filled.count(), 125);
        assert_eq!(filled.get(Index3::new(3, 3, 3)), Some(true));
        assert_eq!(filled.get(Index3::new(0, 3, 3)), Some(false));
    }

    #[test]
    fn test_fill_holes_slicewise_open_ends() {
        // a tube along z: no 3D cavity, but every slice is a closed ring
        let dims = Dims3::new(7, 7, 5).unwrap();
        let m = BinaryMask::from_fn(dims, |p| {
            (1..=5).contains(&p.x)
                && (1..=5).contains(&p.y)
                && (p.x == 1 || p.x == 5 || p.y == 1 || p.y == 5)
        });
        let opts = SeedFillOptions::new(Connectivity::Six);
        assert_eq!(fill_holes(&m, &opts).unwrap(), m);
        let slices = fill_holes(&m, &opts.with_slice_wise(true)).unwrap();
        assert_eq!(slices.count(), 25 * 5);
    }

    #[test]
    fn test_seedfill_reconstruction() {
        let dims = Dims3::new(9, 3, 3).unwrap();
        let clip = BinaryMask::from_fn(dims, |p| p.x < 3 || p.x > 5);
        let filled = seedfill_points(
            &[Index3::new(0, 1, 1)],
            &clip,
            &SeedFillOptions::default(),
        )
        .unwrap();
        assert_eq!(filled.count(), 27);
        assert_eq!(filled.get(Index3::new(7, 1, 1)), Some(false));
    }
}
