//! Grid geometry - dimensions, voxel indices, spacing and origin
//!
//! All volumes in bonelab are regular, isotropic 3D grids stored in
//! x-fastest raster order: the voxel at (x, y, z) lives at index
//! `(z * height + y) * width + x`.

use crate::error::{Error, Result};
use std::fmt;

/// Default isotropic voxel spacing in millimetres (61 µm HR-pQCT)
pub const DEFAULT_SPACING: f64 = 0.0607;

/// A voxel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Index3 {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    /// Slice
    pub z: u32,
}

impl Index3 {
    /// Create a new voxel coordinate
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Offset this coordinate by a signed delta, returning `None` on underflow
    pub fn offset(self, dx: i64, dy: i64, dz: i64) -> Option<Self> {
        let x = i64::from(self.x) + dx;
        let y = i64::from(self.y) + dy;
        let z = i64::from(self.z) + dz;
        Some(Self::new(
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
            u32::try_from(z).ok()?,
        ))
    }

    /// Squared Euclidean distance to another coordinate, in voxels
    pub fn distance_squared(self, other: Index3) -> u64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        let dz = i64::from(self.z) - i64::from(other.z);
        (dx * dx + dy * dy + dz * dz) as u64
    }
}

impl fmt::Display for Index3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Voxel connectivity for neighborhood operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Face neighbors only (6 voxels)
    Six,
    /// Face, edge and corner neighbors (26 voxels, "fully connected")
    #[default]
    TwentySix,
}

const FACE_OFFSETS: [(i64, i64, i64); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

const FULL_OFFSETS: [(i64, i64, i64); 26] = [
    (-1, -1, -1),
    (0, -1, -1),
    (1, -1, -1),
    (-1, 0, -1),
    (0, 0, -1),
    (1, 0, -1),
    (-1, 1, -1),
    (0, 1, -1),
    (1, 1, -1),
    (-1, -1, 0),
    (0, -1, 0),
    (1, -1, 0),
    (-1, 0, 0),
    (1, 0, 0),
    (-1, 1, 0),
    (0, 1, 0),
    (1, 1, 0),
    (-1, -1, 1),
    (0, -1, 1),
    (1, -1, 1),
    (-1, 0, 1),
    (0, 0, 1),
    (1, 0, 1),
    (-1, 1, 1),
    (0, 1, 1),
    (1, 1, 1),
];

impl Connectivity {
    /// Neighbor offsets (dx, dy, dz) for this connectivity
    pub fn offsets(self) -> &'static [(i64, i64, i64)] {
        match self {
            Connectivity::Six => &FACE_OFFSETS,
            Connectivity::TwentySix => &FULL_OFFSETS,
        }
    }

    /// Number of neighbors
    pub fn neighbor_count(self) -> usize {
        self.offsets().len()
    }
}

/// Grid dimensions in voxels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dims3 {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Number of slices
    pub depth: u32,
}

impl Dims3 {
    /// Create new dimensions
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if any extent is 0.
    pub fn new(width: u32, height: u32, depth: u32) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::InvalidDimension {
                width,
                height,
                depth,
            });
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Create dimensions without validation
    pub const fn new_unchecked(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of voxels
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Always false for validated dimensions
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions as a tuple
    #[inline]
    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.depth)
    }

    /// Whether the coordinate lies inside the grid
    #[inline]
    pub fn contains(&self, p: Index3) -> bool {
        p.x < self.width && p.y < self.height && p.z < self.depth
    }

    /// Linear index of an in-grid coordinate (no bounds check)
    #[inline]
    pub fn index(&self, p: Index3) -> usize {
        (p.z as usize * self.height as usize + p.y as usize) * self.width as usize + p.x as usize
    }

    /// Linear index of a coordinate, or `None` if outside the grid
    #[inline]
    pub fn checked_index(&self, p: Index3) -> Option<usize> {
        self.contains(p).then(|| self.index(p))
    }

    /// Coordinate of a linear index
    #[inline]
    pub fn coords(&self, idx: usize) -> Index3 {
        let w = self.width as usize;
        let h = self.height as usize;
        let x = idx % w;
        let y = (idx / w) % h;
        let z = idx / (w * h);
        Index3::new(x as u32, y as u32, z as u32)
    }

    /// Whether a coordinate touches the outer faces of the grid
    #[inline]
    pub fn on_border(&self, p: Index3) -> bool {
        p.x == 0
            || p.y == 0
            || p.z == 0
            || p.x + 1 == self.width
            || p.y + 1 == self.height
            || p.z + 1 == self.depth
    }

    /// Linear indices of the in-grid neighbors of `idx`
    pub fn neighbors(
        &self,
        idx: usize,
        connectivity: Connectivity,
    ) -> impl Iterator<Item = usize> + '_ {
        let p = self.coords(idx);
        connectivity
            .offsets()
            .iter()
            .filter_map(move |&(dx, dy, dz)| {
                p.offset(dx, dy, dz).and_then(|q| self.checked_index(q))
            })
    }
}

impl fmt::Display for Dims3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Physical placement of a voxel grid
///
/// Spacing is isotropic; orientation and resampling are the caller's
/// responsibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    dims: Dims3,
    spacing: f64,
    origin: [f64; 3],
}

impl GridGeometry {
    /// Create a geometry
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSpacing` if `spacing` is not finite and positive.
    pub fn new(dims: Dims3, spacing: f64, origin: [f64; 3]) -> Result<Self> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(Error::InvalidSpacing(spacing));
        }
        Ok(Self {
            dims,
            spacing,
            origin,
        })
    }

    /// Geometry with default spacing and zero origin
    pub fn with_dims(width: u32, height: u32, depth: u32) -> Result<Self> {
        Self::new(Dims3::new(width, height, depth)?, DEFAULT_SPACING, [0.0; 3])
    }

    /// Grid dimensions
    #[inline]
    pub fn dims(&self) -> Dims3 {
        self.dims
    }

    /// Isotropic voxel spacing
    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Physical position of voxel (0, 0, 0)
    #[inline]
    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    /// Physical position of a voxel center
    pub fn physical_point(&self, p: Index3) -> [f64; 3] {
        [
            self.origin[0] + f64::from(p.x) * self.spacing,
            self.origin[1] + f64::from(p.y) * self.spacing,
            self.origin[2] + f64::from(p.z) * self.spacing,
        ]
    }

    /// Nearest voxel to a physical point
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfGrid` if the rounded index falls outside the grid.
    pub fn index_of_point(&self, point: [f64; 3]) -> Result<Index3> {
        let idx = |axis: usize| ((point[axis] - self.origin[axis]) / self.spacing).round() as i64;
        let (x, y, z) = (idx(0), idx(1), idx(2));
        let inside = x >= 0
            && y >= 0
            && z >= 0
            && x < i64::from(self.dims.width)
            && y < i64::from(self.dims.height)
            && z < i64::from(self.dims.depth);
        if !inside {
            return Err(Error::OutOfGrid { x, y, z });
        }
        Ok(Index3::new(x as u32, y as u32, z as u32))
    }

    /// Geometry of a sub-grid starting at `start` with dimensions `dims`
    pub fn sub_geometry(&self, start: Index3, dims: Dims3) -> Self {
        Self {
            dims,
            spacing: self.spacing,
            origin: self.physical_point(start),
        }
    }

    /// Check that another geometry describes the same voxel grid
    ///
    /// # Errors
    ///
    /// Returns `Error::DimensionMismatch` if the dimensions differ.
    pub fn check_compatible(&self, other: &GridGeometry) -> Result<()> {
        if self.dims != other.dims {
            return Err(Error::DimensionMismatch {
                expected: self.dims.as_tuple(),
                actual: other.dims.as_tuple(),
            });
        }
        Ok(())
    }

    /// Whether spacing and origin also agree within a small tolerance
    pub fn same_placement(&self, other: &GridGeometry) -> bool {
        const TOL: f64 = 1e-6;
        self.dims == other.dims
            && (self.spacing - other.spacing).abs() < TOL
            && self
                .origin
                .iter()
                .zip(other.origin.iter())
                .all(|(a, b)| (a - b).abs() < TOL)
    }
}
