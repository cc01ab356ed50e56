//! Seeded erosion segmentation
//!
//! An erosion is a low-intensity break in the cortical shell, lying inside
//! the bone's contour. Segmentation of one run proceeds in a crop around the
//! bone:
//!
//! 1. intensities are smoothed and the void mask (contour voxels outside
//!    the bone thresholds) is derived;
//! 2. a *core compartment* keeps the voids wide enough to be erosions and
//!    linked to a seed, cutting thin connections into trabecular spaces;
//! 3. each seed grows from its core component under an adaptive intensity
//!    threshold, a trabecular leak test and a growth radius cap;
//! 4. the grown regions are merged, optionally smoothed and labeled, one
//!    label per connected group of seeds.
//!
//! Growth is a bounded loop that polls a [`CancelToken`] once per layer. A
//! cancelled run returns [`SegmentError::Cancelled`] and commits nothing.

use crate::cancel::CancelToken;
use crate::error::{SegmentError, SegmentResult, SegmentWarning};
use crate::options::{ErosionOptions, GrowthPreset};
use bonelab_core::{BinaryMask, Connectivity, Dims3, Index3, Labelmap, SeedPoint, Volume};
use bonelab_filter::{RunningStats, gaussian_smooth, threshold};
use bonelab_morph::{close_ball, dilate_ball, erode_ball, open_ball};
use bonelab_region::{
    SeedFillOptions, label_connected_components, seedfill_binary, seedfill_points,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// One labeled erosion of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ErosionRegion {
    /// Label in the run's labelmap, 1..K
    pub label: u32,
    /// Seeds that grew into this region, ascending
    pub seed_ids: Vec<u32>,
    /// Number of voxels
    pub voxel_count: usize,
    /// Growth stopped at the layer or radius cap
    pub growth_capped: bool,
}

/// Result of [`segment_erosions`]
#[derive(Debug)]
pub struct ErosionRun {
    /// Caller-assigned run identifier
    pub run_id: u32,
    /// Contour label the run was restricted to
    pub bone: u32,
    /// Full-size labelmap of the run's regions
    pub labelmap: Labelmap,
    /// Regions ordered by label
    pub regions: Vec<ErosionRegion>,
    /// Seeds that were rejected, with the reason
    pub rejected: Vec<SegmentError>,
    /// Non-fatal conditions
    pub warnings: Vec<SegmentWarning>,
}

impl ErosionRun {
    /// Region carrying `label`
    pub fn region(&self, label: u32) -> Option<&ErosionRegion> {
        self.regions.iter().find(|r| r.label == label)
    }

    /// Region a seed ended up in
    pub fn region_of_seed(&self, seed_id: u32) -> Option<&ErosionRegion> {
        self.regions.iter().find(|r| r.seed_ids.contains(&seed_id))
    }
}

/// Core compartment: voids at least `min_radius` wide, cut from thin
/// trabecular connections and linked to a seed
fn core_compartment(
    void: &BinaryMask,
    seeds: &[Index3],
    preset: &GrowthPreset,
) -> SegmentResult<BinaryMask> {
    let d = preset.dilate_erode_distance;
    let fill = SeedFillOptions::new(Connectivity::TwentySix);
    let mut seed_mask = BinaryMask::new(void.dims());
    for &p in seeds {
        seed_mask.set(p, true)?;
    }

    let eroded = erode_ball(&open_ball(void, preset.min_radius), d);
    let bridge = eroded.or(&dilate_ball(&seed_mask, d))?;
    let linked = seedfill_binary(&seed_mask, &bridge, &fill)?.and(&eroded)?;
    let core = dilate_ball(&linked, d).and(void)?;

    let combine_radius = if d > 5 { 3 } else { 5 };
    let widened = dilate_ball(&core, combine_radius).and(void)?;
    Ok(seedfill_points(seeds, &widened, &fill)?)
}

struct Growth {
    voxels: Vec<usize>,
    capped: bool,
}

/// Read-only state shared by every seed of a run
struct GrowthField<'a> {
    dims: Dims3,
    intensity: &'a [f32],
    contour: &'a [bool],
    outside: &'a [bool],
    core: &'a [u32],
    lower: f64,
    preset: GrowthPreset,
    leak_threshold: f32,
    max_radius: u32,
}

impl GrowthField<'_> {
    /// Fraction of in-grid 26-neighbors outside the bone thresholds
    fn void_fraction(&self, idx: usize) -> f32 {
        let (mut total, mut outside) = (0u32, 0u32);
        for j in self.dims.neighbors(idx, Connectivity::TwentySix) {
            total += 1;
            if self.outside[j] {
                outside += 1;
            }
        }
        if total == 0 {
            0.0
        } else {
            outside as f32 / total as f32
        }
    }

    /// Acceptance threshold `min(lower, mu + k * sd + f * (lower - mu))`
    fn acceptance(&self, stats: &RunningStats) -> f64 {
        let mu = stats.mean();
        let t = mu
            + self.preset.sigma_multiplier * stats.std_dev()
            + self.preset.tolerance * (self.lower - mu);
        t.min(self.lower)
    }

    fn grow(&self, origin: Index3, run_id: u32, cancel: &CancelToken) -> SegmentResult<Growth> {
        let start = self.dims.index(origin);
        let mut member = vec![false; self.dims.len()];
        member[start] = true;
        let mut front = vec![start];
        let max_r2 = u64::from(self.max_radius).pow(2);
        let mut capped = false;
        let core = self.core[start];
        if core != 0 {
            for (i, &l) in self.core.iter().enumerate() {
                if l != core || member[i] {
                    continue;
                }
                // the radius cap binds the core component too
                if self.dims.coords(i).distance_squared(origin) > max_r2 {
                    capped = true;
                    continue;
                }
                member[i] = true;
                front.push(i);
            }
        }

        let mut stats = RunningStats::new();
        stats.extend(front.iter().map(|&i| self.intensity[i]));
        let mut limit = self.acceptance(&stats);
        let refresh = self.preset.refresh_interval.max(1);

        for layer in 1..=self.max_radius {
            if cancel.is_cancelled() {
                return Err(SegmentError::Cancelled { run_id });
            }
            if layer % refresh == 0 {
                limit = self.acceptance(&stats);
            }
            let mut next = Vec::new();
            for &i in &front {
                for j in self.dims.neighbors(i, Connectivity::TwentySix) {
                    if member[j] || !self.contour[j] {
                        continue;
                    }
                    let v = f64::from(self.intensity[j]);
                    if v > limit || v >= self.lower {
                        continue;
                    }
                    if self.void_fraction(j) < self.leak_threshold {
                        continue;
                    }
                    if self.dims.coords(j).distance_squared(origin) > max_r2 {
                        capped = true;
                        continue;
                    }
                    member[j] = true;
                    next.push(j);
                }
            }
            if next.is_empty() {
                break;
            }
            stats.extend(next.iter().map(|&j| self.intensity[j]));
            front = next;
            if layer == self.max_radius {
                capped = true;
            }
        }

        let voxels = member
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect();
        Ok(Growth { voxels, capped })
    }
}

/// Segment the erosions of one bone from user-placed seeds
///
/// # Arguments
///
/// * `volume` - Scan
/// * `contour` - Contour labelmap on the scan's grid
/// * `bone` - Contour label the erosions belong to
/// * `seeds` - Growth origins; invalid seeds are rejected individually
/// * `options` - Thresholds, smoothing, size mode and advanced parameters
/// * `run_id` - Identifier carried into warnings and provenance
/// * `cancel` - Polled once per growth layer
///
/// # Errors
///
/// Returns `SegmentError::Cancelled` if the token fires before the run
/// commits, `InvalidParameters` for bone 0 or invalid options, and
/// `DimensionMismatch` (wrapped) if the contour is on another grid.
/// Rejected seeds are listed in [`ErosionRun::rejected`] instead.
pub fn segment_erosions(
    volume: &Volume,
    contour: &Labelmap,
    bone: u32,
    seeds: &[SeedPoint],
    options: &ErosionOptions,
    run_id: u32,
    cancel: &CancelToken,
) -> SegmentResult<ErosionRun> {
    options.validate()?;
    if bone == 0 {
        return Err(SegmentError::InvalidParameters(
            "bone label must be positive".to_string(),
        ));
    }
    volume.geometry().check_compatible(contour.geometry())?;
    let geometry = *volume.geometry();
    let dims = geometry.dims();

    let mut rejected = Vec::new();
    let mut valid = Vec::new();
    for seed in seeds {
        if !dims.contains(seed.position) {
            rejected.push(SegmentError::SeedOutOfBounds {
                seed_id: seed.id,
                position: seed.position,
                dims,
            });
        } else if contour.get(seed.position) != Some(bone) {
            rejected.push(SegmentError::SeedOutsideContour {
                seed_id: seed.id,
                position: seed.position,
                bone,
            });
        } else {
            valid.push(*seed);
        }
    }
    for err in &rejected {
        log::warn!("run {run_id}: {err}");
    }

    let mut run = ErosionRun {
        run_id,
        bone,
        labelmap: Labelmap::new(geometry),
        regions: Vec::new(),
        rejected,
        warnings: Vec::new(),
    };
    if valid.is_empty() {
        log::debug!("run {run_id}: no valid seeds, nothing to grow");
        return Ok(run);
    }
    if cancel.is_cancelled() {
        return Err(SegmentError::Cancelled { run_id });
    }

    let bounds = contour
        .bounds_of(bone)
        .ok_or(SegmentError::ThresholdEmpty { bone })?;
    let margin = (3.0 * options.sigma).ceil() as u32 + 1;
    let crop = bounds.expand(margin, dims);
    let sub = volume.crop(&crop)?;
    let sub_dims = sub.dims();
    let bone_mask = contour.crop(&crop)?.mask_of(bone);
    let smoothed = gaussian_smooth(&sub, options.sigma)?;
    let outside = threshold(&smoothed, options.thresholds)?.invert();
    let void = bone_mask.and(&outside)?;

    let local: Vec<(u32, Index3)> = valid
        .iter()
        .filter_map(|s| crop.to_local(s.position).map(|p| (s.id, p)))
        .collect();
    let origins: Vec<Index3> = local.iter().map(|&(_, p)| p).collect();

    let preset = options.growth_preset();
    let advanced = options.advanced.clamped();
    let core = core_compartment(&void, &origins, &preset)?;
    let core_map = label_connected_components(&core, Connectivity::TwentySix)?;
    log::debug!(
        "run {run_id}: bone {bone}, {} void voxels, {} core voxels in {} compartments",
        void.count(),
        core.count(),
        core_map.len()
    );

    let field = GrowthField {
        dims: sub_dims,
        intensity: smoothed.data(),
        contour: bone_mask.data(),
        outside: outside.data(),
        core: core_map.labels(),
        lower: f64::from(options.thresholds.lower),
        preset,
        leak_threshold: advanced.trabecular_leak_threshold,
        max_radius: advanced.max_growth_radius,
    };
    let growths = origins
        .par_iter()
        .map(|&p| field.grow(p, run_id, cancel))
        .collect::<SegmentResult<Vec<_>>>()?;

    let mut union = BinaryMask::new(sub_dims);
    for growth in &growths {
        for &i in &growth.voxels {
            union.data_mut()[i] = true;
        }
    }
    if advanced.smoothing_radius > 0 {
        union = close_ball(&union, advanced.smoothing_radius)
            .and(&bone_mask)?
            .or(&union)?;
    }

    // one label per connected group of seeds, ordered by lowest seed id
    let components = label_connected_components(&union, Connectivity::TwentySix)?;
    let mut groups: BTreeMap<u32, (Vec<u32>, bool)> = BTreeMap::new();
    for (&(id, p), growth) in local.iter().zip(&growths) {
        let component = components.labels()[sub_dims.index(p)];
        let entry = groups.entry(component).or_default();
        entry.0.push(id);
        entry.1 |= growth.capped;
    }
    let mut ordered: Vec<(u32, Vec<u32>, bool)> = groups
        .into_iter()
        .filter(|&(component, _)| component != 0)
        .map(|(component, (mut ids, capped))| {
            ids.sort_unstable();
            ids.dedup();
            (component, ids, capped)
        })
        .collect();
    ordered.sort_by_key(|(_, ids, _)| ids.first().copied());

    let mapping: BTreeMap<u32, u32> = ordered
        .iter()
        .zip(1u32..)
        .map(|((component, _, _), label)| (*component, label))
        .collect();
    let mut counts = vec![0usize; ordered.len()];
    let data: Vec<u32> = components
        .labels()
        .iter()
        .map(|l| match mapping.get(l) {
            Some(&label) => {
                counts[label as usize - 1] += 1;
                label
            }
            None => 0,
        })
        .collect();
    let labeled = Labelmap::from_data(geometry.sub_geometry(crop.min, sub_dims), data)?;

    let numbered = ordered.into_iter().zip(1u32..).zip(counts);
    for (((_, seed_ids, capped), label), voxel_count) in numbered {
        if capped {
            run.warnings.push(
                SegmentWarning::GrowthTimeout {
                    run_id,
                    label,
                    seed_ids: seed_ids.clone(),
                }
                .raise(),
            );
        }
        run.regions.push(ErosionRegion {
            label,
            seed_ids,
            voxel_count,
            growth_capped: capped,
        });
    }

    if cancel.is_cancelled() {
        return Err(SegmentError::Cancelled { run_id });
    }
    run.labelmap.paste(&labeled, crop.min)?;
    log::debug!(
        "run {run_id}: {} region(s), {} voxels",
        run.regions.len(),
        run.labelmap.foreground_count()
    );
    Ok(run)
}
