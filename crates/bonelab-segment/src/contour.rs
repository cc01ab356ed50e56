//! Periosteal contour extraction
//!
//! For every bone the thresholded voxels are cropped with a margin, denoised,
//! closed with a large ball to bridge cortical breaks, and their cavities
//! are filled, giving the solid envelope the bone would have if intact.
//!
//! Bones are processed in parallel. Merging happens afterwards in label
//! order, so the result does not depend on scheduling:
//!
//! - a voxel that belongs to a bone's own thresholded mask stays with that
//!   bone;
//! - any other voxel claimed by several envelopes goes to the bone whose
//!   thresholded voxels are nearest, the lower label winning ties.

use crate::error::{SegmentError, SegmentResult, SegmentWarning};
use crate::options::{ContourOptions, FillMode, SeparationOptions};
use crate::separator::{BoneRecord, BoneSeparation, bone_records, separate_bones};
use bonelab_core::{BinaryMask, Bounds3, Connectivity, Dims3, GridGeometry, Labelmap, Volume};
use bonelab_filter::{DistanceMap, smooth_mask, squared_distance, threshold};
use bonelab_morph::close_ball;
use bonelab_region::{SeedFillOptions, fill_holes};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Result of [`extract_contours`]
#[derive(Debug, Clone)]
pub struct ContourSet {
    /// Contour label per voxel; each bone keeps its separation label
    pub contour: Labelmap,
    /// One record per separated bone, including empty ones
    pub bones: Vec<BoneRecord>,
    /// Non-fatal conditions
    pub warnings: Vec<SegmentWarning>,
}

impl ContourSet {
    /// Record of one bone
    pub fn bone(&self, label: u32) -> Option<&BoneRecord> {
        self.bones.iter().find(|b| b.label == label)
    }
}

/// Envelope of one bone, local to its crop
struct BonePiece {
    label: u32,
    crop: Bounds3,
    contour: BinaryMask,
    original: BinaryMask,
}

impl BonePiece {
    fn global_index(&self, dims: Dims3, local: usize) -> usize {
        dims.index(self.crop.to_global(self.contour.dims().coords(local)))
    }
}

fn bone_piece(
    thresholded: &BinaryMask,
    separation: &Labelmap,
    label: u32,
    options: &ContourOptions,
) -> SegmentResult<Option<BonePiece>> {
    let dims = thresholded.dims();
    let data = separation
        .data()
        .iter()
        .zip(thresholded.data())
        .map(|(&l, &t)| t && l == label)
        .collect();
    let mask = BinaryMask::from_data(dims, data)?;
    let Some(bounds) = mask.bounds() else {
        return Ok(None);
    };

    let margin = options.closing_radius + 2;
    let crop = bounds.expand(margin, dims);
    let original = mask.crop(&crop)?;

    // background the crop could not take from the volume
    let available = [
        bounds.min.x - crop.min.x,
        bounds.min.y - crop.min.y,
        bounds.min.z - crop.min.z,
        crop.max.x - bounds.max.x,
        crop.max.y - bounds.max.y,
        crop.max.z - bounds.max.z,
    ];
    let pad = margin.saturating_sub(available.into_iter().min().unwrap_or(margin));
    let padded = if pad > 0 {
        original.pad(pad)
    } else {
        original.clone()
    };

    let denoised = if options.sigma > 0.0 {
        smooth_mask(&padded, options.sigma, 0.5)?
    } else {
        padded.clone()
    };
    let closed = close_ball(&denoised, options.closing_radius).or(&padded)?;
    let fill = SeedFillOptions::new(Connectivity::Six)
        .with_slice_wise(options.fill_mode == FillMode::SliceWise);
    let filled = fill_holes(&closed, &fill)?;
    let contour = if pad > 0 { filled.unpad(pad)? } else { filled };

    log::debug!(
        "bone {}: {} thresholded voxels, {} contour voxels",
        label,
        original.count(),
        contour.count()
    );
    Ok(Some(BonePiece {
        label,
        crop,
        contour,
        original,
    }))
}

fn merge_pieces(geometry: GridGeometry, pieces: &[BonePiece]) -> SegmentResult<Labelmap> {
    let dims = geometry.dims();
    let mut origin = vec![0u32; dims.len()];
    for piece in pieces {
        let local = piece.original.dims();
        for i in piece.original.iter_set() {
            origin[dims.index(piece.crop.to_global(local.coords(i)))] = piece.label;
        }
    }

    let mut owner = vec![0u32; dims.len()];
    let mut contested: Vec<(usize, u32)> = Vec::new();
    for piece in pieces {
        for i in piece.contour.iter_set() {
            let g = piece.global_index(dims, i);
            match (origin[g], owner[g]) {
                (0, 0) => owner[g] = piece.label,
                (0, _) => contested.push((g, piece.label)),
                (o, _) if o == piece.label => owner[g] = o,
                _ => {}
            }
        }
    }

    if !contested.is_empty() {
        log::debug!("contours: resolving {} contested voxels", contested.len());
        let index: BTreeMap<u32, usize> = pieces
            .iter()
            .enumerate()
            .map(|(k, p)| (p.label, k))
            .collect();
        let mut distances: Vec<Option<DistanceMap>> = pieces.iter().map(|_| None).collect();
        let mut distance = |label: u32, g: usize| -> f64 {
            let Some(&k) = index.get(&label) else {
                return f64::INFINITY;
            };
            let piece = &pieces[k];
            let map = distances[k].get_or_insert_with(|| squared_distance(&piece.original, true));
            piece
                .crop
                .to_local(dims.coords(g))
                .map_or(f64::INFINITY, |p| map.squared(piece.original.dims().index(p)))
        };
        for (g, challenger) in contested {
            let current = owner[g];
            let d_current = distance(current, g);
            let d_challenger = distance(challenger, g);
            if (d_challenger, challenger) < (d_current, current) {
                owner[g] = challenger;
            }
        }
    }

    Ok(Labelmap::from_data(geometry, owner)?)
}

/// Extract one solid envelope per bone
///
/// # Arguments
///
/// * `volume` - Scan
/// * `options` - Thresholds, closing radius, denoise sigma and fill mode
/// * `separation` - Bones to process; when `None` the thresholded voxels
///   are separated into connected components first
///
/// # Errors
///
/// Returns an error for invalid options, a separation on another grid, or
/// an empty threshold mask when no separation is given. A bone without
/// voxels only produces an `EmptyContour` warning.
pub fn extract_contours(
    volume: &Volume,
    options: &ContourOptions,
    separation: Option<&BoneSeparation>,
) -> SegmentResult<ContourSet> {
    options.validate()?;
    let mut warnings = Vec::new();
    let computed;
    let separation = match separation {
        Some(sep) => sep,
        None => {
            let sep_options = SeparationOptions::new().with_thresholds(options.thresholds);
            computed = separate_bones(volume, &sep_options, None)?;
            warnings.extend(computed.warnings.iter().cloned());
            &computed
        }
    };
    volume
        .geometry()
        .check_compatible(separation.labelmap.geometry())?;

    let thresholded = threshold(volume, options.thresholds)?;
    let pieces = separation
        .bones
        .par_iter()
        .map(|bone| bone_piece(&thresholded, &separation.labelmap, bone.label, options))
        .collect::<SegmentResult<Vec<_>>>()?;

    let mut kept = Vec::with_capacity(pieces.len());
    for (bone, piece) in separation.bones.iter().zip(pieces) {
        match piece {
            Some(piece) if !piece.contour.is_empty() => kept.push(piece),
            _ => warnings.push(SegmentWarning::EmptyContour { bone: bone.label }.raise()),
        }
    }

    let contour = merge_pieces(*volume.geometry(), &kept)?;
    let found = bone_records(&contour);
    let bones = separation
        .bones
        .iter()
        .map(|b| {
            found
                .iter()
                .find(|r| r.label == b.label)
                .cloned()
                .unwrap_or(BoneRecord {
                    label: b.label,
                    voxel_count: 0,
                    bounds: None,
                })
        })
        .collect();

    Ok(ContourSet {
        contour,
        bones,
        warnings,
    })
}

/// Extract the envelope of a single bone
///
/// No overlap resolution is applied; the result carries `bone` as its only
/// label.
///
/// # Errors
///
/// Returns `SegmentError::ThresholdEmpty` if the bone has no thresholded
/// voxels.
pub fn extract_bone_contour(
    volume: &Volume,
    separation: &Labelmap,
    bone: u32,
    options: &ContourOptions,
) -> SegmentResult<Labelmap> {
    options.validate()?;
    volume.geometry().check_compatible(separation.geometry())?;
    let thresholded = threshold(volume, options.thresholds)?;
    let piece = bone_piece(&thresholded, separation, bone, options)?
        .ok_or(SegmentError::ThresholdEmpty { bone })?;
    merge_pieces(*volume.geometry(), std::slice::from_ref(&piece))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonelab_core::Index3;
    use bonelab_filter::ThresholdRange;
    use std::ops::Range;

    fn ring_volume() -> Volume {
        let geom = GridGeometry::with_dims(24, 24, 8).unwrap();
        Volume::from_fn(geom, |p| {
            let dx = f64::from(p.x) - 12.0;
            let dy = f64::from(p.y) - 12.0;
            let r2 = dx * dx + dy * dy;
            if r2 <= 36.0 && r2 > 9.0 { 800.0 } else { 0.0 }
        })
    }

    fn options() -> ContourOptions {
        ContourOptions::new()
            .with_thresholds(ThresholdRange::new(200, 1200).unwrap())
            .with_closing_radius(2)
            .with_sigma(0.0)
    }

    #[test]
    fn test_ring_is_filled() {
        let volume = ring_volume();
        let set = extract_contours(&volume, &options(), None).unwrap();
        assert_eq!(set.contour.labels(), vec![1]);
        assert_eq!(set.contour.get(Index3::new(12, 12, 4)), Some(1));
        assert_eq!(set.contour.get(Index3::new(12, 12, 0)), Some(1));
        assert_eq!(set.contour.get(Index3::new(0, 0, 4)), Some(0));
    }

    #[test]
    fn test_volume_fill_keeps_open_tube() {
        let volume = ring_volume();
        let opts = options().with_fill_mode(FillMode::Volume3d);
        let set = extract_contours(&volume, &opts, None).unwrap();
        assert_eq!(set.contour.get(Index3::new(12, 12, 4)), Some(0));
    }

    #[test]
    fn test_single_bone_empty_is_error() {
        let volume = ring_volume();
        let sep = Labelmap::new(*volume.geometry());
        let err = extract_bone_contour(&volume, &sep, 1, &options()).unwrap_err();
        assert!(matches!(err, SegmentError::ThresholdEmpty { bone: 1 }));
    }

    fn piece(label: u32, dims: Dims3, original: Range<u32>, contour: Range<u32>) -> BonePiece {
        BonePiece {
            label,
            crop: Bounds3::full(dims),
            contour: BinaryMask::from_fn(dims, |p| contour.contains(&p.x)),
            original: BinaryMask::from_fn(dims, |p| original.contains(&p.x)),
        }
    }

    #[test]
    fn test_merge_resolves_by_distance() {
        let geom = GridGeometry::with_dims(11, 1, 1).unwrap();
        let dims = geom.dims();
        let pieces = [piece(1, dims, 0..2, 0..10), piece(2, dims, 9..11, 3..11)];
        let merged = merge_pieces(geom, &pieces).unwrap();
        let got: Vec<u32> = merged.data().to_vec();
        // x = 5 is equidistant and goes to the lower label
        assert_eq!(got, vec![1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2]);
    }

    #[test]
    fn test_separated_slabs_keep_their_voxels() {
        let geom = GridGeometry::with_dims(20, 8, 8).unwrap();
        let volume = Volume::from_fn(geom, |p| {
            if (3..=8).contains(&p.x) || (11..=16).contains(&p.x) {
                800.0
            } else {
                0.0
            }
        });
        let sep_opts = SeparationOptions::new()
            .with_thresholds(ThresholdRange::new(200, 1200).unwrap())
            .with_bone_count(2)
            .with_min_component_size(1);
        let sep = separate_bones(&volume, &sep_opts, None).unwrap();
        let set = extract_contours(&volume, &options(), Some(&sep)).unwrap();
        for (i, &l) in sep.labelmap.data().iter().enumerate() {
            if l != 0 {
                assert_eq!(set.contour.data()[i], l);
            }
        }
        assert_eq!(set.contour.get(Index3::new(10, 4, 4)), Some(0));
        assert_eq!(set.bones.len(), 2);
        assert!(set.warnings.is_empty());
    }
}
