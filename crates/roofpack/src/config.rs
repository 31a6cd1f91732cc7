//! Pipeline configuration.
//!
//! Every tunable constant of the pipeline lives here with its default.
//! All structs are `#[serde(default)]`, so a config file only needs to name
//! the values it changes:
//!
//! ```yaml
//! layout:
//!   angle_degrees: 15
//!   unit_length: 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mask::ContourFilter;
use crate::pack::{PackerOptions, PanelLayout};
use crate::vision::BilateralSmoothing;

/// Settings for turning a source image into a rooftop mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Bilateral filter applied before sharpening
    pub smoothing: BilateralSmoothing,
    /// Canny hysteresis thresholds
    pub canny_low: f32,
    pub canny_high: f32,
    /// Filter for contours traced from the Otsu threshold image
    pub threshold_filter: ContourFilter,
    /// Filter for contours traced from the Canny edge map
    pub edge_filter: ContourFilter,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            smoothing: BilateralSmoothing::default(),
            canny_low: 180.0,
            canny_high: 240.0,
            threshold_filter: ContourFilter::THRESHOLD,
            edge_filter: ContourFilter::EDGE,
        }
    }
}

impl MaskConfig {
    pub fn with_canny(mut self, low: f32, high: f32) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    pub fn with_smoothing(mut self, smoothing: BilateralSmoothing) -> Self {
        self.smoothing = smoothing;
        self
    }
}

/// Complete configuration for one run of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mask: MaskConfig,
    pub layout: PanelLayout,
    pub packer: PackerOptions,
}

impl PipelineConfig {
    pub fn with_layout(mut self, layout: PanelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_packer(mut self, packer: PackerOptions) -> Self {
        self.packer = packer;
        self
    }

    pub fn with_mask(mut self, mask: MaskConfig) -> Self {
        self.mask = mask;
        self
    }

    /// Check everything that would otherwise fail halfway through a batch.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        self.packer.validate()
    }
}
