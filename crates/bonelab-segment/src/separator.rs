//! Bone separation
//!
//! Partitions the thresholded voxels of a scan into bones. A user-supplied
//! separation map is authoritative and is only extended, geodesically,
//! over thresholded voxels it leaves uncovered. Without a map, bones are
//! the connected components of the threshold mask, largest first.

use crate::error::{SegmentError, SegmentResult, SegmentWarning};
use crate::options::SeparationOptions;
use bonelab_core::{Bounds3, Labelmap, Volume};
use bonelab_filter::threshold;
use bonelab_region::{
    component_stats, label_connected_components, propagate_labels, relabel_by_size,
};
use std::collections::BTreeMap;

/// One bone of a separation or contour
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRecord {
    /// Label carried by the bone's voxels
    pub label: u32,
    /// Number of voxels
    pub voxel_count: usize,
    /// Bounding box, `None` when the bone has no voxels
    pub bounds: Option<Bounds3>,
}

impl BoneRecord {
    /// True if the bone has no voxels
    pub fn is_empty(&self) -> bool {
        self.voxel_count == 0
    }
}

/// Result of [`separate_bones`]
#[derive(Debug, Clone)]
pub struct BoneSeparation {
    /// Bone label per voxel, 1..N
    pub labelmap: Labelmap,
    /// One record per bone, ordered by label
    pub bones: Vec<BoneRecord>,
    /// Non-fatal conditions
    pub warnings: Vec<SegmentWarning>,
}

impl BoneSeparation {
    /// Number of bones found
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Record of one bone
    pub fn bone(&self, label: u32) -> Option<&BoneRecord> {
        self.bones.iter().find(|b| b.label == label)
    }
}

pub(crate) fn bone_records(labelmap: &Labelmap) -> Vec<BoneRecord> {
    component_stats(labelmap)
        .into_iter()
        .map(|s| BoneRecord {
            label: s.label,
            voxel_count: s.voxel_count,
            bounds: Some(s.bounds),
        })
        .collect()
}

/// Partition thresholded voxels into bones
///
/// # Arguments
///
/// * `volume` - Scan to separate
/// * `options` - Thresholds, expected bone count and noise floor
/// * `map` - Optional authoritative separation map on the same grid
///
/// # Errors
///
/// Returns `SegmentError::ThresholdEmpty` if no voxel passes the
/// thresholds, and `InvalidParameters` for invalid options.
pub fn separate_bones(
    volume: &Volume,
    options: &SeparationOptions,
    map: Option<&Labelmap>,
) -> SegmentResult<BoneSeparation> {
    options.validate()?;
    let mask = threshold(volume, options.thresholds)?;
    let voxels = mask.count();
    if voxels == 0 {
        return Err(SegmentError::ThresholdEmpty { bone: 0 });
    }
    log::debug!(
        "separate_bones: {} of {} voxels within [{}, {}]",
        voxels,
        mask.dims().len(),
        options.thresholds.lower,
        options.thresholds.upper
    );

    let labelmap = match map {
        Some(map) => {
            volume.geometry().check_compatible(map.geometry())?;
            let seeds: Vec<u32> = map
                .data()
                .iter()
                .zip(mask.data())
                .map(|(&l, &m)| if m { l } else { 0 })
                .collect();
            let seeds = Labelmap::from_data(*volume.geometry(), seeds)?;
            let propagation = propagate_labels(&seeds, &mask, options.connectivity)?;
            if propagation.unreached > 0 {
                log::debug!(
                    "separate_bones: {} thresholded voxels not reachable from any map label",
                    propagation.unreached
                );
            }
            let mut labelmap = propagation.labels;
            let compact: BTreeMap<u32, u32> = labelmap.labels().into_iter().zip(1u32..).collect();
            labelmap.relabel(&compact);
            labelmap
        }
        None => {
            let components = label_connected_components(&mask, options.connectivity)?;
            let largest = components
                .components()
                .iter()
                .map(|c| c.voxel_count)
                .max()
                .unwrap_or(0);
            // never let the noise floor empty a non-empty mask
            let floor = options.min_component_size.min(largest);
            log::debug!(
                "separate_bones: {} components, noise floor {} voxels",
                components.len(),
                floor
            );
            relabel_by_size(&components, floor).into_labelmap(*volume.geometry())?
        }
    };

    let bones = bone_records(&labelmap);
    let mut warnings = Vec::new();
    let found = bones.len() as u32;
    if found != options.bone_count {
        warnings.push(
            SegmentWarning::BoneCountMismatch {
                requested: options.bone_count,
                found,
            }
            .raise(),
        );
    }

    Ok(BoneSeparation {
        labelmap,
        bones,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonelab_core::{GridGeometry, Index3};
    use bonelab_filter::ThresholdRange;

    fn two_blocks() -> Volume {
        let geom = GridGeometry::with_dims(20, 6, 6).unwrap();
        // 3-voxel-wide block at x 1..=3 and a 7-wide block at x 10..=16
        Volume::from_fn(geom, |p| {
            if (1..=3).contains(&p.x) || (10..=16).contains(&p.x) {
                800.0
            } else {
                0.0
            }
        })
    }

    fn options() -> SeparationOptions {
        SeparationOptions::new()
            .with_thresholds(ThresholdRange::new(200, 1200).unwrap())
            .with_min_component_size(10)
    }

    #[test]
    fn test_components_largest_first() {
        let sep = separate_bones(&two_blocks(), &options().with_bone_count(2), None).unwrap();
        assert_eq!(sep.bone_count(), 2);
        assert!(sep.warnings.is_empty());
        assert_eq!(sep.labelmap.get(Index3::new(12, 2, 2)), Some(1));
        assert_eq!(sep.labelmap.get(Index3::new(2, 2, 2)), Some(2));
        assert_eq!(sep.bone(1).unwrap().voxel_count, 7 * 36);
    }

    #[test]
    fn test_count_mismatch_is_warning() {
        let sep = separate_bones(&two_blocks(), &options().with_bone_count(3), None).unwrap();
        assert_eq!(
            sep.warnings,
            vec![SegmentWarning::BoneCountMismatch {
                requested: 3,
                found: 2
            }]
        );
    }

    #[test]
    fn test_noise_floor_keeps_largest() {
        let opts = options().with_min_component_size(100_000);
        let sep = separate_bones(&two_blocks(), &opts, None).unwrap();
        assert_eq!(sep.bone_count(), 1);
        assert_eq!(sep.labelmap.get(Index3::new(12, 2, 2)), Some(1));
    }

    #[test]
    fn test_empty_threshold_is_error() {
        let opts =
            SeparationOptions::new().with_thresholds(ThresholdRange::new(5000, 6000).unwrap());
        let err = separate_bones(&two_blocks(), &opts, None).unwrap_err();
        assert!(matches!(err, SegmentError::ThresholdEmpty { bone: 0 }));
    }

    #[test]
    fn test_map_is_authoritative() {
        let volume = two_blocks();
        let mut map = Labelmap::new(*volume.geometry());
        // one hint inside each block, with labels out of order
        map.set(Index3::new(2, 0, 0), 9).unwrap();
        map.set(Index3::new(16, 5, 5), 4).unwrap();
        // the two halves of the big block get different labels
        map.set(Index3::new(10, 0, 0), 9).unwrap();
        let sep = separate_bones(&volume, &options().with_bone_count(2), Some(&map)).unwrap();
        assert_eq!(sep.bone_count(), 2);
        // 4 -> 1, 9 -> 2
        assert_eq!(sep.labelmap.get(Index3::new(16, 5, 5)), Some(1));
        assert_eq!(sep.labelmap.get(Index3::new(1, 5, 5)), Some(2));
        assert_eq!(sep.labelmap.get(Index3::new(10, 5, 0)), Some(2));
        // background stays unlabeled
        assert_eq!(sep.labelmap.get(Index3::new(6, 2, 2)), Some(0));
        let total: usize = sep.bones.iter().map(|b| b.voxel_count).sum();
        assert_eq!(total, 10 * 36);
    }
}
