//! Binary morphology regression test
//!
//! Tests dilation, erosion, opening, and closing on a synthetic cortical
//! ring, and checks the ball operations against their set definitions.
//!
//! Run with:
//! ```
//! cargo test -p bonelab-morph --test binmorph_reg
//! ```

use bonelab_core::{BinaryMask, Index3};
use bonelab_morph::{close_ball, dilate_ball, erode_ball, open_ball};
use bonelab_test::{Phantom, RegParams};

fn ring_mask() -> BinaryMask {
    let volume = Phantom::new(40, 40, 12, 0.0)
        .unwrap()
        .tube((20.0, 20.0), 8.0, 12.0, 2..10, 1.0)
        .build();
    BinaryMask::from_fn(volume.dims(), |p| volume.get(p) == Some(1.0))
}

#[test]
fn binmorph_reg() {
    let mut rp = RegParams::new("binmorph");
    let ring = ring_mask();
    let orig = ring.count();
    eprintln!("Ring voxels: {}", orig);

    // Dilation is extensive, erosion anti-extensive
    let dilated = dilate_ball(&ring, 2);
    let eroded = erode_ball(&ring, 2);
    rp.check(dilated.count() > orig);
    rp.check(eroded.count() < orig);
    rp.check(ring.and_not(&dilated).unwrap().is_empty());
    rp.check(eroded.and_not(&ring).unwrap().is_empty());

    // Erosion and dilation are dual: eroding the ring equals dilating the
    // background and complementing, away from the grid border
    let dual = dilate_ball(&ring.invert(), 2).invert();
    let dims = ring.dims();
    let inside = |v: u32, n: u32| v >= 2 && v + 2 < n;
    let interior =
        |p: Index3| inside(p.x, dims.width) && inside(p.y, dims.height) && inside(p.z, dims.depth);
    let agree = (0..dims.len()).all(|i| {
        let p = dims.coords(i);
        !interior(p) || eroded.data()[i] == dual.data()[i]
    });
    rp.check(agree);

    // The outer wall at (32, 20) grows by exactly two voxels
    rp.check(ring.get(Index3::new(33, 20, 6)) == Some(false));
    rp.check(dilated.get(Index3::new(34, 20, 6)) == Some(true));
    rp.check(dilated.get(Index3::new(35, 20, 6)) == Some(false));

    // Closing is idempotent
    let closed = close_ball(&ring, 3);
    rp.compare_masks(&closed, &close_ball(&closed, 3));

    // Opening with a ball wider than the wall removes the ring
    rp.check(open_ball(&ring, 3).count() < orig);
    rp.check(open_ball(&ring, 6).is_empty());

    assert!(rp.cleanup(), "binmorph regression test failed");
}
