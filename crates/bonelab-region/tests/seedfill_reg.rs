//! Seed fill regression test
//!
//! Fills the marrow cavity of a closed cortical shell, compares 3D and
//! slice-wise hole filling on an open-ended tube, and propagates two bone
//! labels through a shared mask.
//!
//! Run with:
//! ```
//! cargo test -p bonelab-region --test seedfill_reg
//! ```

use bonelab_core::{BinaryMask, Connectivity, Index3, Labelmap};
use bonelab_region::{SeedFillOptions, fill_holes, propagate_labels, seedfill_points};
use bonelab_test::{Phantom, RegParams};

#[test]
fn seedfill_reg() {
    let mut rp = RegParams::new("seedfill");

    // Open tube: slice-wise filling closes the marrow, 3D filling does not
    let tube = Phantom::new(30, 30, 10, 0.0)
        .unwrap()
        .tube((15.0, 15.0), 6.0, 10.0, 0..10, 1.0)
        .build();
    let wall = BinaryMask::from_fn(tube.dims(), |p| tube.get(p) == Some(1.0));
    let solid = Phantom::new(30, 30, 10, 0.0)
        .unwrap()
        .cylinder((15.0, 15.0), 10.0, 0..10, 1.0)
        .build();
    let solid = BinaryMask::from_fn(solid.dims(), |p| solid.get(p) == Some(1.0));

    let opts = SeedFillOptions::new(Connectivity::Six);
    rp.compare_masks(&wall, &fill_holes(&wall, &opts).unwrap());
    rp.compare_masks(
        &solid,
        &fill_holes(&wall, &opts.clone().with_slice_wise(true)).unwrap(),
    );

    // Capped tube: the cavity is enclosed in 3D
    let capped = Phantom::new(30, 30, 12, 0.0)
        .unwrap()
        .tube((15.0, 15.0), 6.0, 10.0, 1..11, 1.0)
        .cylinder((15.0, 15.0), 10.0, 1..2, 1.0)
        .cylinder((15.0, 15.0), 10.0, 10..11, 1.0)
        .build();
    let capped = BinaryMask::from_fn(capped.dims(), |p| capped.get(p) == Some(1.0));
    let filled = fill_holes(&capped, &opts).unwrap();
    rp.check(filled.get(Index3::new(15, 15, 5)) == Some(true));
    rp.check(filled.get(Index3::new(15, 15, 0)) == Some(false));

    // Reconstruction from a seed stays inside its component
    let rec = seedfill_points(&[Index3::new(15, 5, 5)], &wall, &SeedFillOptions::default())
        .unwrap();
    rp.compare_masks(&wall, &rec);

    // Propagation: two labels on either side of a bar split it
    let bar = Phantom::new(21, 3, 3, 0.0).unwrap().build();
    let mut seeds = Labelmap::new(*bar.geometry());
    seeds.set(Index3::new(0, 1, 1), 1).unwrap();
    seeds.set(Index3::new(20, 1, 1), 2).unwrap();
    let everything = BinaryMask::from_fn(bar.dims(), |_| true);
    let prop = propagate_labels(&seeds, &everything, Connectivity::TwentySix).unwrap();
    rp.compare_values(0.0, prop.unreached as f64, 0.0);
    rp.compare_values(
        1.0,
        f64::from(prop.labels.get(Index3::new(9, 1, 1)).unwrap_or(0)),
        0.0,
    );
    rp.compare_values(
        2.0,
        f64::from(prop.labels.get(Index3::new(11, 1, 1)).unwrap_or(0)),
        0.0,
    );

    assert!(rp.cleanup(), "seedfill regression test failed");
}
