//! Independent erosion runs executed in parallel

use crate::cancel::CancelToken;
use crate::erosion::{ErosionRun, segment_erosions};
use crate::error::SegmentResult;
use crate::options::ErosionOptions;
use bonelab_core::{Labelmap, SeedPoint, Volume};
use rayon::prelude::*;

/// One erosion run to execute
#[derive(Debug, Clone)]
pub struct ErosionJob {
    /// Identifier carried into the run's result
    pub run_id: u32,
    /// Contour label to segment within
    pub bone: u32,
    /// Growth origins
    pub seeds: Vec<SeedPoint>,
    /// Growth options
    pub options: ErosionOptions,
}

impl ErosionJob {
    /// Job with default options
    pub fn new(run_id: u32, bone: u32, seeds: Vec<SeedPoint>) -> Self {
        Self {
            run_id,
            bone,
            seeds,
            options: ErosionOptions::default(),
        }
    }

    /// Set the growth options
    pub fn with_options(mut self, options: ErosionOptions) -> Self {
        self.options = options;
        self
    }
}

/// Run every job against the same scan and contour
///
/// Results are returned in job order. A failing job does not affect the
/// others; a fired `cancel` makes every unfinished job return `Cancelled`.
pub fn run_erosion_jobs(
    volume: &Volume,
    contour: &Labelmap,
    jobs: &[ErosionJob],
    cancel: &CancelToken,
) -> Vec<SegmentResult<ErosionRun>> {
    log::debug!("running {} erosion job(s)", jobs.len());
    jobs.par_iter()
        .map(|job| {
            segment_erosions(
                volume,
                contour,
                job.bone,
                &job.seeds,
                &job.options,
                job.run_id,
                cancel,
            )
        })
        .collect()
}
