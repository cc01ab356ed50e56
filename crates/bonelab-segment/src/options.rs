//! Option sets for the segmentation stages
//!
//! Every stage takes a plain options struct with workflow defaults and
//! `with_*` builders. Values supplied by a user interface map onto them
//! directly: thresholds onto [`ThresholdRange`], the bone count onto
//! [`SeparationOptions::bone_count`], the size flag onto [`SizeMode`] and the
//! advanced sliders onto [`AdvancedParameters`].

use crate::error::{SegmentError, SegmentResult};
use bonelab_core::Connectivity;
use bonelab_filter::ThresholdRange;

/// Default contour thresholds
pub const CONTOUR_THRESHOLDS: ThresholdRange = ThresholdRange {
    lower: 3000,
    upper: 10000,
};

/// Default erosion thresholds
pub const EROSION_THRESHOLDS: ThresholdRange = ThresholdRange {
    lower: 686,
    upper: 15000,
};

/// Smallest component kept as a bone, in voxels
pub const DEFAULT_MIN_COMPONENT_SIZE: usize = 927;

/// Options for [`separate_bones`](crate::separate_bones)
#[derive(Debug, Clone)]
pub struct SeparationOptions {
    /// Intensity window defining bone
    pub thresholds: ThresholdRange,
    /// Expected number of bones (advisory)
    pub bone_count: u32,
    /// Noise floor for connected components, in voxels
    pub min_component_size: usize,
    /// Connectivity for component labeling and label propagation
    pub connectivity: Connectivity,
}

impl Default for SeparationOptions {
    fn default() -> Self {
        Self {
            thresholds: CONTOUR_THRESHOLDS,
            bone_count: 1,
            min_component_size: DEFAULT_MIN_COMPONENT_SIZE,
            connectivity: Connectivity::TwentySix,
        }
    }
}

impl SeparationOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the intensity window
    pub fn with_thresholds(mut self, thresholds: ThresholdRange) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the expected bone count
    pub fn with_bone_count(mut self, count: u32) -> Self {
        self.bone_count = count;
        self
    }

    /// Set the component noise floor
    pub fn with_min_component_size(mut self, voxels: usize) -> Self {
        self.min_component_size = voxels;
        self
    }

    /// Set connectivity
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub(crate) fn validate(&self) -> SegmentResult<()> {
        self.thresholds.validate()?;
        if self.bone_count == 0 {
            return Err(SegmentError::InvalidParameters(
                "number of bones must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How enclosed cavities are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Fill each axial slice from its border; closes marrow cavities of
    /// bones that leave the scan at either end
    #[default]
    SliceWise,
    /// Fill cavities fully enclosed in 3D
    Volume3d,
}

/// Options for [`extract_contours`](crate::extract_contours)
#[derive(Debug, Clone)]
pub struct ContourOptions {
    /// Intensity window defining bone
    pub thresholds: ThresholdRange,
    /// Ball radius of the closing, in voxels
    pub closing_radius: u32,
    /// Gaussian sigma of the mask denoise step, in voxels (0 disables it)
    pub sigma: f32,
    /// Cavity filling strategy
    pub fill_mode: FillMode,
}

impl Default for ContourOptions {
    fn default() -> Self {
        Self {
            thresholds: CONTOUR_THRESHOLDS,
            closing_radius: 34,
            sigma: 2.0,
            fill_mode: FillMode::SliceWise,
        }
    }
}

impl ContourOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the intensity window
    pub fn with_thresholds(mut self, thresholds: ThresholdRange) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the closing radius
    pub fn with_closing_radius(mut self, radius: u32) -> Self {
        self.closing_radius = radius;
        self
    }

    /// Set the denoise sigma
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the cavity filling strategy
    pub fn with_fill_mode(mut self, mode: FillMode) -> Self {
        self.fill_mode = mode;
        self
    }

    pub(crate) fn validate(&self) -> SegmentResult<()> {
        self.thresholds.validate()?;
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(SegmentError::InvalidParameters(format!(
                "contour sigma must be >= 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

/// Erosion size flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeMode {
    /// Conservative growth for small erosions
    #[default]
    Small,
    /// Tolerant growth for large erosions
    Large,
}

/// Growth constants selected by a [`SizeMode`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthPreset {
    /// Narrowest void kept in the core compartment, in voxels
    pub min_radius: u32,
    /// Ball radius that cuts voids from trabecular spaces, in voxels
    pub dilate_erode_distance: u32,
    /// Fraction of the gap between region mean and lower threshold that
    /// the acceptance threshold may add
    pub tolerance: f64,
    /// Standard deviations above the region mean still accepted
    pub sigma_multiplier: f64,
    /// Layers between refreshes of the region statistics
    pub refresh_interval: u32,
}

impl SizeMode {
    /// Growth constants for this mode
    pub fn preset(self) -> GrowthPreset {
        match self {
            SizeMode::Small => GrowthPreset {
                min_radius: 3,
                dilate_erode_distance: 4,
                tolerance: 0.25,
                sigma_multiplier: 1.5,
                refresh_interval: 1,
            },
            SizeMode::Large => GrowthPreset {
                min_radius: 6,
                dilate_erode_distance: 6,
                tolerance: 0.5,
                sigma_multiplier: 2.5,
                refresh_interval: 2,
            },
        }
    }
}

/// Bounded user-tunable growth parameters
///
/// Values outside their range are clamped by [`clamped`](Self::clamped),
/// never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvancedParameters {
    /// Minimum fraction of void voxels in a candidate's 26-neighborhood,
    /// in `[0, 1]`; higher is more conservative
    pub trabecular_leak_threshold: f32,
    /// Ball radius of the post-growth smoothing, in `[0, 10]`
    pub smoothing_radius: u32,
    /// Hard cap on growth distance and layers, in `[1, 500]`
    pub max_growth_radius: u32,
    /// Override for the mode's dilate/erode distance, in `[0, 20]`
    pub dilate_erode_distance: Option<u32>,
}

impl Default for AdvancedParameters {
    fn default() -> Self {
        Self {
            trabecular_leak_threshold: 0.5,
            smoothing_radius: 1,
            max_growth_radius: 50,
            dilate_erode_distance: None,
        }
    }
}

impl AdvancedParameters {
    /// Copy with every value forced into its range
    pub fn clamped(&self) -> Self {
        let leak = if self.trabecular_leak_threshold.is_nan() {
            Self::default().trabecular_leak_threshold
        } else {
            self.trabecular_leak_threshold.clamp(0.0, 1.0)
        };
        Self {
            trabecular_leak_threshold: leak,
            smoothing_radius: self.smoothing_radius.min(10),
            max_growth_radius: self.max_growth_radius.clamp(1, 500),
            dilate_erode_distance: self.dilate_erode_distance.map(|d| d.min(20)),
        }
    }
}

/// Options for [`segment_erosions`](crate::segment_erosions)
#[derive(Debug, Clone)]
pub struct ErosionOptions {
    /// Intensity window of mineralized bone; voids fall below `lower`
    pub thresholds: ThresholdRange,
    /// Gaussian sigma applied to intensities before growth, in voxels
    pub sigma: f32,
    /// Size flag
    pub size_mode: SizeMode,
    /// Advanced growth parameters
    pub advanced: AdvancedParameters,
}

impl Default for ErosionOptions {
    fn default() -> Self {
        Self {
            thresholds: EROSION_THRESHOLDS,
            sigma: 1.0,
            size_mode: SizeMode::Small,
            advanced: AdvancedParameters::default(),
        }
    }
}

impl ErosionOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the intensity window
    pub fn with_thresholds(mut self, thresholds: ThresholdRange) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the smoothing sigma
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the size flag
    pub fn with_size_mode(mut self, mode: SizeMode) -> Self {
        self.size_mode = mode;
        self
    }

    /// Set advanced parameters
    pub fn with_advanced(mut self, advanced: AdvancedParameters) -> Self {
        self.advanced = advanced;
        self
    }

    /// Mode preset with the dilate/erode override applied
    pub fn growth_preset(&self) -> GrowthPreset {
        let mut preset = self.size_mode.preset();
        if let Some(d) = self.advanced.clamped().dilate_erode_distance {
            preset.dilate_erode_distance = d;
        }
        preset
    }

    pub(crate) fn validate(&self) -> SegmentResult<()> {
        self.thresholds.validate()?;
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(SegmentError::InvalidParameters(format!(
                "erosion sigma must be >= 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}
