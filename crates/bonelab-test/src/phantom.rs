//! Synthetic bone phantoms
//!
//! No scan data ships with the repository, so regression tests build their
//! inputs from simple solids painted into a background. Later shapes
//! overwrite earlier ones. Noise is drawn from a seeded generator so every
//! run sees the same volume.

use crate::error::TestResult;
use bonelab_core::{Bounds3, GridGeometry, Index3, Volume};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Builder for synthetic intensity volumes
#[derive(Debug, Clone)]
pub struct Phantom {
    geometry: GridGeometry,
    data: Vec<f32>,
}

impl Phantom {
    /// Uniform background with default spacing
    pub fn new(width: u32, height: u32, depth: u32, background: f32) -> TestResult<Self> {
        Ok(Self::with_geometry(
            GridGeometry::with_dims(width, height, depth)?,
            background,
        ))
    }

    /// Uniform background on an explicit grid
    pub fn with_geometry(geometry: GridGeometry, background: f32) -> Self {
        Self {
            geometry,
            data: vec![background; geometry.dims().len()],
        }
    }

    fn paint(mut self, value: f32, inside: impl Fn(Index3) -> bool) -> Self {
        let dims = self.geometry.dims();
        for (i, v) in self.data.iter_mut().enumerate() {
            if inside(dims.coords(i)) {
                *v = value;
            }
        }
        self
    }

    /// Solid cylinder along z
    pub fn cylinder(self, center: (f64, f64), radius: f64, z: Range<u32>, value: f32) -> Self {
        self.tube(center, 0.0, radius, z, value)
    }

    /// Hollow cylinder along z; voxels with `inner < r <= outer` are painted
    pub fn tube(
        self,
        center: (f64, f64),
        inner: f64,
        outer: f64,
        z: Range<u32>,
        value: f32,
    ) -> Self {
        self.paint(value, |p| {
            let dx = f64::from(p.x) - center.0;
            let dy = f64::from(p.y) - center.1;
            let r2 = dx * dx + dy * dy;
            z.contains(&p.z) && r2 <= outer * outer && (inner <= 0.0 || r2 > inner * inner)
        })
    }

    /// Solid ball
    pub fn sphere(self, center: [f64; 3], radius: f64, value: f32) -> Self {
        self.paint(value, |p| {
            let dx = f64::from(p.x) - center[0];
            let dy = f64::from(p.y) - center[1];
            let dz = f64::from(p.z) - center[2];
            dx * dx + dy * dy + dz * dz <= radius * radius
        })
    }

    /// Axis-aligned block (inclusive bounds)
    pub fn block(self, bounds: Bounds3, value: f32) -> Self {
        self.paint(value, |p| bounds.contains(p))
    }

    /// Add uniform noise in `[-amplitude, amplitude]`
    pub fn noise(mut self, seed: u64, amplitude: f32) -> Self {
        if amplitude > 0.0 {
            let mut rng = StdRng::seed_from_u64(seed);
            for v in self.data.iter_mut() {
                *v += rng.random_range(-amplitude..=amplitude);
            }
        }
        self
    }

    /// Finish the volume
    pub fn build(self) -> Volume {
        let dims = self.geometry.dims();
        let data = self.data;
        Volume::from_fn(self.geometry, |p| data[dims.index(p)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_paints_inside() {
        let v = Phantom::new(20, 20, 10, 0.0)
            .unwrap()
            .cylinder((10.0, 10.0), 4.0, 2..8, 5000.0)
            .build();
        assert_eq!(v.get(Index3::new(10, 10, 5)), Some(5000.0));
        assert_eq!(v.get(Index3::new(10, 10, 8)), Some(0.0));
        assert_eq!(v.get(Index3::new(15, 10, 5)), Some(0.0));
    }

    #[test]
    fn test_tube_is_hollow() {
        let v = Phantom::new(20, 20, 4, 0.0)
            .unwrap()
            .tube((10.0, 10.0), 3.0, 6.0, 0..4, 1.0)
            .build();
        assert_eq!(v.get(Index3::new(10, 10, 1)), Some(0.0));
        assert_eq!(v.get(Index3::new(15, 10, 1)), Some(1.0));
    }

    #[test]
    fn test_noise_is_reproducible() {
        let a = Phantom::new(6, 6, 6, 100.0).unwrap().noise(7, 10.0).build();
        let b = Phantom::new(6, 6, 6, 100.0).unwrap().noise(7, 10.0).build();
        assert_eq!(a.data(), b.data());
        assert!(a.data().iter().all(|&v| (90.0..=110.0).contains(&v)));
    }
}
