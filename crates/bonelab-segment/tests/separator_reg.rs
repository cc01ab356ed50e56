//! Bone separation regression test
//!
//! Separates a single noisy cylinder, two disjoint cylinders, and two
//! touching cylinders guided by a painted separation map.
//!
//! Run with:
//! ```
//! cargo test -p bonelab-segment --test separator_reg
//! ```

use bonelab_core::{Index3, Labelmap};
use bonelab_filter::{ThresholdRange, threshold};
use bonelab_segment::{SegmentError, SegmentWarning, SeparationOptions, separate_bones};
use bonelab_test::{Phantom, RegParams};

fn options() -> SeparationOptions {
    SeparationOptions::new().with_thresholds(ThresholdRange::new(200, 1200).unwrap())
}

#[test]
fn separator_reg() {
    let mut rp = RegParams::new("separator");

    // Single cylinder: one bone covering exactly the thresholded voxels
    let volume = Phantom::new(40, 40, 24, 0.0)
        .unwrap()
        .cylinder((20.0, 20.0), 10.0, 0..24, 800.0)
        .noise(7, 50.0)
        .build();
    let sep = separate_bones(&volume, &options(), None).unwrap();
    rp.compare_values(1.0, sep.bone_count() as f64, 0.0);
    rp.check(sep.warnings.is_empty());
    let mask = threshold(&volume, options().thresholds).unwrap();
    let expected = Labelmap::from_mask(*volume.geometry(), &mask, 1).unwrap();
    rp.compare_labelmaps(&expected, &sep.labelmap);

    // Two cylinders of different size: largest first, count mismatch warned
    let two = Phantom::new(48, 24, 10, 0.0)
        .unwrap()
        .cylinder((12.0, 12.0), 6.0, 0..10, 800.0)
        .cylinder((34.0, 12.0), 9.0, 0..10, 800.0)
        .build();
    let sep = separate_bones(&two, &options().with_min_component_size(1), None).unwrap();
    rp.compare_values(2.0, sep.bone_count() as f64, 0.0);
    rp.check(sep.labelmap.get(Index3::new(34, 12, 5)) == Some(1));
    rp.check(sep.labelmap.get(Index3::new(12, 12, 5)) == Some(2));
    rp.check(
        sep.warnings
            == vec![SegmentWarning::BoneCountMismatch {
                requested: 1,
                found: 2,
            }],
    );
    let big = sep.bone(1).unwrap();
    let small = sep.bone(2).unwrap();
    rp.check(big.voxel_count > small.voxel_count);

    // Touching cylinders: a painted map splits them
    let fused = Phantom::new(40, 20, 6, 0.0)
        .unwrap()
        .cylinder((12.0, 10.0), 8.0, 0..6, 800.0)
        .cylinder((27.0, 10.0), 8.0, 0..6, 800.0)
        .build();
    let sep = separate_bones(&fused, &options().with_min_component_size(1), None).unwrap();
    rp.compare_values(1.0, sep.bone_count() as f64, 0.0);
    let mut map = Labelmap::new(*fused.geometry());
    map.set(Index3::new(8, 10, 3), 4).unwrap();
    map.set(Index3::new(31, 10, 3), 9).unwrap();
    let sep = separate_bones(&fused, &options().with_bone_count(2), Some(&map)).unwrap();
    rp.compare_values(2.0, sep.bone_count() as f64, 0.0);
    rp.check(sep.warnings.is_empty());
    rp.check(sep.labelmap.get(Index3::new(6, 10, 0)) == Some(1));
    rp.check(sep.labelmap.get(Index3::new(33, 10, 5)) == Some(2));
    let fused_mask = threshold(&fused, options().thresholds).unwrap();
    rp.compare_values(
        fused_mask.count() as f64,
        sep.labelmap.foreground_count() as f64,
        0.0,
    );

    // Nothing within the thresholds
    let empty = Phantom::new(8, 8, 8, 0.0).unwrap().build();
    let err = separate_bones(&empty, &options(), None).unwrap_err();
    rp.check(matches!(err, SegmentError::ThresholdEmpty { bone: 0 }));

    assert!(rp.cleanup(), "separator regression test failed");
}
