//! Combine erosion labelmaps by priority
//!
//! Layers are ranked with manual corrections first, then in caller order.
//! Each voxel keeps the label of the highest-ranked layer that claims it.
//! The surviving voxels are renumbered so that every connected piece of a
//! layer's label gets its own label, and each new label records where it
//! came from.

use crate::erosion::ErosionRun;
use crate::error::{SegmentError, SegmentResult, SegmentWarning};
use bonelab_core::{Connectivity, Labelmap};
use bonelab_region::label_by_value;
use std::collections::BTreeMap;

/// One prioritized input of [`combine_erosions`]
#[derive(Debug, Clone)]
pub struct ErosionLayer {
    /// Run the labelmap came from
    pub run_id: u32,
    /// Erosion labels of the run
    pub labelmap: Labelmap,
    /// Seeds behind each label, if known
    pub seed_ids: BTreeMap<u32, Vec<u32>>,
    /// Manual corrections outrank every automatic layer
    pub manual: bool,
}

impl ErosionLayer {
    /// Automatic layer
    pub fn new(run_id: u32, labelmap: Labelmap) -> Self {
        Self {
            run_id,
            labelmap,
            seed_ids: BTreeMap::new(),
            manual: false,
        }
    }

    /// Manual correction layer
    pub fn manual(run_id: u32, labelmap: Labelmap) -> Self {
        Self {
            manual: true,
            ..Self::new(run_id, labelmap)
        }
    }

    /// Record the seeds behind `label`
    pub fn with_seed_ids(mut self, label: u32, ids: Vec<u32>) -> Self {
        self.seed_ids.insert(label, ids);
        self
    }
}

impl From<&ErosionRun> for ErosionLayer {
    fn from(run: &ErosionRun) -> Self {
        Self {
            run_id: run.run_id,
            labelmap: run.labelmap.clone(),
            seed_ids: run
                .regions
                .iter()
                .map(|r| (r.label, r.seed_ids.clone()))
                .collect(),
            manual: false,
        }
    }
}

/// Where a combined label came from
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOrigin {
    /// Label in the combined labelmap
    pub label: u32,
    /// Run that claimed the voxels
    pub run_id: u32,
    /// Label the voxels carried in that run
    pub source_label: u32,
    /// Seeds behind the source label
    pub seed_ids: Vec<u32>,
    /// Voxels carrying the combined label
    pub voxel_count: usize,
    /// The claiming layer was a manual correction
    pub manual: bool,
}

/// Result of [`combine_erosions`]
#[derive(Debug, Clone)]
pub struct CombinedErosionSet {
    /// Combined labels 1..K
    pub labelmap: Labelmap,
    /// One entry per combined label, ordered by label
    pub provenance: Vec<LabelOrigin>,
    /// Non-fatal conditions
    pub warnings: Vec<SegmentWarning>,
}

impl CombinedErosionSet {
    /// Number of combined labels
    pub fn label_count(&self) -> usize {
        self.provenance.len()
    }

    /// Provenance of one combined label
    pub fn origin(&self, label: u32) -> Option<&LabelOrigin> {
        self.provenance.iter().find(|o| o.label == label)
    }
}

/// Merge erosion layers into one labelmap
///
/// Manual layers are ranked first (keeping their relative order), then the
/// remaining layers in the order given. Contested voxels stay with the
/// higher-ranked layer; each losing pair of runs is reported once as an
/// `OverlapResolved` warning.
///
/// Labels are numbered by layer rank, then source label, then raster order
/// of the first voxel of each 26-connected piece, so identical inputs give
/// identical output.
///
/// # Errors
///
/// Returns `SegmentError::InvalidParameters` for an empty layer list and a
/// wrapped `DimensionMismatch` if the layers do not share a grid.
pub fn combine_erosions(layers: &[ErosionLayer]) -> SegmentResult<CombinedErosionSet> {
    let first = layers.first().ok_or_else(|| {
        SegmentError::InvalidParameters("no erosion layers to combine".to_string())
    })?;
    let geometry = *first.labelmap.geometry();
    for layer in &layers[1..] {
        geometry.check_compatible(layer.labelmap.geometry())?;
        if !geometry.same_placement(layer.labelmap.geometry()) {
            log::debug!("combine: run {} differs in spacing or origin", layer.run_id);
        }
    }
    let dims = geometry.dims();

    let mut ranked: Vec<&ErosionLayer> = layers.iter().collect();
    ranked.sort_by_key(|layer| !layer.manual);

    // rank + 1 of the claiming layer, 0 when unclaimed
    let mut owner = vec![0u32; dims.len()];
    let mut source = vec![0u32; dims.len()];
    let mut conflicts: BTreeMap<(u32, u32), usize> = BTreeMap::new();
    for (rank, layer) in (1u32..).zip(&ranked) {
        for (i, &label) in layer.labelmap.data().iter().enumerate() {
            if label == 0 {
                continue;
            }
            if owner[i] == 0 {
                owner[i] = rank;
                source[i] = label;
            } else {
                *conflicts.entry((owner[i], rank)).or_insert(0) += 1;
            }
        }
    }

    let warnings: Vec<SegmentWarning> = conflicts
        .into_iter()
        .map(|((winner, loser), voxels)| {
            let winner = ranked[winner as usize - 1].run_id;
            let loser = ranked[loser as usize - 1].run_id;
            SegmentWarning::OverlapResolved {
                winner,
                loser,
                voxels,
            }
            .raise()
        })
        .collect();

    // one value per (rank, source label) claim set, ascending in that order
    let mut claim_sets: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for (&rank, &label) in owner.iter().zip(&source) {
        if rank != 0 {
            claim_sets.insert((rank, label), 0);
        }
    }
    let keys: Vec<(u32, u32)> = claim_sets.keys().copied().collect();
    for (value, key) in (1u32..).zip(&keys) {
        claim_sets.insert(*key, value);
    }
    let values: Vec<u32> = owner
        .iter()
        .zip(&source)
        .map(|(&rank, &label)| {
            if rank == 0 {
                0
            } else {
                claim_sets.get(&(rank, label)).copied().unwrap_or(0)
            }
        })
        .collect();

    let pieces = label_by_value(dims, &values, Connectivity::TwentySix)?;
    let mut order: Vec<_> = pieces.components().iter().collect();
    order.sort_by_key(|c| (c.value, c.first_index));

    let mut mapping: BTreeMap<u32, u32> = BTreeMap::new();
    let mut provenance = Vec::with_capacity(order.len());
    for (label, piece) in (1u32..).zip(order) {
        mapping.insert(piece.label, label);
        let (rank, source_label) = keys[piece.value as usize - 1];
        let layer = ranked[rank as usize - 1];
        provenance.push(LabelOrigin {
            label,
            run_id: layer.run_id,
            source_label,
            seed_ids: layer
                .seed_ids
                .get(&source_label)
                .cloned()
                .unwrap_or_default(),
            voxel_count: piece.voxel_count,
            manual: layer.manual,
        });
    }

    let data = pieces
        .labels()
        .iter()
        .map(|l| mapping.get(l).copied().unwrap_or(0))
        .collect();
    let labelmap = Labelmap::from_data(geometry, data)?;
    log::debug!(
        "combine: {} layer(s) -> {} label(s), {} voxels",
        layers.len(),
        provenance.len(),
        labelmap.foreground_count()
    );
    Ok(CombinedErosionSet {
        labelmap,
        provenance,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonelab_core::{GridGeometry, Index3};

    fn line_layer(run_id: u32, cells: &[(u32, u32)]) -> ErosionLayer {
        let geom = GridGeometry::with_dims(12, 1, 1).unwrap();
        let mut lm = Labelmap::new(geom);
        for &(x, label) in cells {
            lm.set(Index3::new(x, 0, 0), label).unwrap();
        }
        ErosionLayer::new(run_id, lm)
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = combine_erosions(&[]).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidParameters(_)));
    }

    #[test]
    fn test_dims_mismatch_is_error() {
        let a = ErosionLayer::new(1, Labelmap::new(GridGeometry::with_dims(4, 4, 4).unwrap()));
        let b = ErosionLayer::new(2, Labelmap::new(GridGeometry::with_dims(4, 4, 5).unwrap()));
        assert!(combine_erosions(&[a, b]).is_err());
    }

    #[test]
    fn test_first_layer_wins() {
        let a = line_layer(10, &[(2, 1), (3, 1), (4, 1)]);
        let b = line_layer(20, &[(4, 5), (5, 5)]);
        let set = combine_erosions(&[a, b]).unwrap();
        assert_eq!(set.labelmap.get(Index3::new(4, 0, 0)), Some(1));
        assert_eq!(set.labelmap.get(Index3::new(5, 0, 0)), Some(2));
        assert_eq!(set.origin(2).unwrap().run_id, 20);
        assert_eq!(set.origin(2).unwrap().source_label, 5);
        assert_eq!(
            set.warnings,
            vec![SegmentWarning::OverlapResolved {
                winner: 10,
                loser: 20,
                voxels: 1
            }]
        );
    }

    #[test]
    fn test_manual_layer_outranks_caller_order() {
        let auto = line_layer(1, &[(0, 1), (1, 1), (2, 1)]);
        let manual = ErosionLayer::manual(9, line_layer(9, &[(1, 3), (2, 3)]).labelmap);
        let set = combine_erosions(&[auto, manual]).unwrap();
        assert_eq!(set.labelmap.get(Index3::new(1, 0, 0)), Some(1));
        assert_eq!(set.labelmap.get(Index3::new(0, 0, 0)), Some(2));
        let origin = set.origin(1).unwrap();
        assert!(origin.manual);
        assert_eq!(origin.run_id, 9);
    }

    #[test]
    fn test_split_claim_gets_two_labels() {
        // run 2's label 1 is cut in two by run 1
        let a = line_layer(1, &[(5, 1)]);
        let b = line_layer(2, &[(3, 1), (4, 1), (5, 1), (6, 1), (7, 1)]).with_seed_ids(1, vec![4]);
        let set = combine_erosions(&[a, b]).unwrap();
        assert_eq!(set.label_count(), 3);
        assert_eq!(set.labelmap.get(Index3::new(3, 0, 0)), Some(2));
        assert_eq!(set.labelmap.get(Index3::new(7, 0, 0)), Some(3));
        assert_eq!(set.origin(3).unwrap().seed_ids, vec![4]);
        assert_eq!(set.origin(3).unwrap().voxel_count, 2);
    }
}
