//! Binary morphological operations
//!
//! Ball erosion, dilation, opening and closing for 3D binary masks. Each
//! operation thresholds an exact Euclidean distance transform, so its cost
//! does not depend on the radius, which matters for the large closings
//! applied to bone contours.
//!
//! Voxels outside the grid never contribute to dilation and never remove
//! voxels during erosion.

use bonelab_core::BinaryMask;
use bonelab_filter::squared_distance;

/// Dilate with a Euclidean ball of `radius` voxels
pub fn dilate_ball(mask: &BinaryMask, radius: u32) -> BinaryMask {
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }
    squared_distance(mask, true).within(f64::from(radius))
}

/// Erode with a Euclidean ball of `radius` voxels
pub fn erode_ball(mask: &BinaryMask, radius: u32) -> BinaryMask {
    if radius == 0 {
        return mask.clone();
    }
    // distance to the nearest background voxel
    squared_distance(mask, false).beyond(f64::from(radius))
}

/// Open with a Euclidean ball of `radius` voxels
pub fn open_ball(mask: &BinaryMask, radius: u32) -> BinaryMask {
    dilate_ball(&erode_ball(mask, radius), radius)
}

/// Close with a Euclidean ball of `radius` voxels
///
/// Foreground within `radius` of the grid border may be eroded less than
/// in an unbounded grid; callers that need a true closing pad the mask by
/// at least `radius` first.
pub fn close_ball(mask: &BinaryMask, radius: u32) -> BinaryMask {
    erode_ball(&dilate_ball(mask, radius), radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonelab_core::{Dims3, Index3};

    fn point_mask(size: u32, p: Index3) -> BinaryMask {
        let dims = Dims3::new(size, size, size).unwrap();
        BinaryMask::from_fn(dims, |q| q == p)
    }

    /// Reference dilation by direct search of the ball
    fn brute_dilate(mask: &BinaryMask, radius: u32) -> BinaryMask {
        let r2 = u64::from(radius).pow(2);
        BinaryMask::from_fn(mask.dims(), |p| {
            mask.iter_set().any(|i| mask.dims().coords(i).distance_squared(p) <= r2)
        })
    }

    #[test]
    fn test_dilate_point() {
        let m = point_mask(5, Index3::new(2, 2, 2));
        let d = dilate_ball(&m, 1);
        assert_eq!(d.count(), 7);
        assert_eq!(d.get(Index3::new(2, 2, 3)), Some(true));
        assert_eq!(d.get(Index3::new(3, 3, 2)), Some(false));
    }

    #[test]
    fn test_erode_cube() {
        let dims = Dims3::new(7, 7, 7).unwrap();
        let m = BinaryMask::from_fn(dims, |p| {
            (1..=5).contains(&p.x) && (1..=5).contains(&p.y) && (1..=5).contains(&p.z)
        });
        let e = erode_ball(&m, 1);
        assert_eq!(e.count(), 27);
        assert_eq!(e.get(Index3::new(1, 1, 1)), Some(false));
        assert_eq!(e.get(Index3::new(2, 2, 2)), Some(true));
    }

    #[test]
    fn test_ball_matches_direct_search() {
        let dims = Dims3::new(12, 11, 10).unwrap();
        let m = BinaryMask::from_fn(dims, |p| {
            (p.x * 7 + p.y * 3 + p.z * 5) % 11 == 0 || (p.x > 4 && p.x < 8 && p.y > 3)
        });
        for radius in 1..=3 {
            assert_eq!(dilate_ball(&m, radius), brute_dilate(&m, radius));
        }
    }

    #[test]
    fn test_close_fills_gap() {
        let dims = Dims3::new(20, 9, 9).unwrap();
        // two slabs separated by a 2-voxel gap
        let m = BinaryMask::from_fn(dims, |p| {
            (2..=7).contains(&p.x) || (10..=15).contains(&p.x)
        });
        let closed = close_ball(&m, 2);
        assert_eq!(closed.get(Index3::new(8, 4, 4)), Some(true));
        assert_eq!(closed.get(Index3::new(9, 4, 4)), Some(true));
        // closing is extensive
        assert!(m.and_not(&closed).unwrap().is_empty());
    }

    #[test]
    fn test_open_removes_speck() {
        let m = point_mask(9, Index3::new(4, 4, 4));
        assert!(open_ball(&m, 1).is_empty());
        assert_eq!(close_ball(&m, 0), m);
    }
}
