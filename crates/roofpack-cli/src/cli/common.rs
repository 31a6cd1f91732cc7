//! Common utilities shared across CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use roofpack::{OccupancyScan, PipelineConfig};

/// Command-line overrides for the configuration file.
///
/// Anything left unset keeps the value from the file (or the default).
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Placement angle in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub angle: Option<f64>,

    /// Unit length in pixels (upsampled resolution)
    #[arg(long)]
    pub unit_length: Option<u32>,

    /// Unit width in pixels (upsampled resolution)
    #[arg(long)]
    pub unit_width: Option<u32>,

    /// Units per array along the long edge, first sweep
    #[arg(long)]
    pub array_length: Option<u32>,

    /// Units per array across the long edge
    #[arg(long)]
    pub array_width: Option<u32>,

    /// Occupancy scan: bbox or exhaustive
    #[arg(long)]
    pub scan: Option<String>,

    /// Stop packing an image after this many milliseconds
    #[arg(long)]
    pub time_budget_ms: Option<u64>,
}

impl ConfigArgs {
    /// Load the file (if any), then apply the flags on top.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => PipelineConfig::default(),
        };

        let layout = &mut config.layout;
        if let Some(angle) = self.angle {
            layout.angle_degrees = angle;
        }
        if let Some(n) = self.unit_length {
            layout.unit_length = n;
        }
        if let Some(n) = self.unit_width {
            layout.unit_width = n;
        }
        if let Some(n) = self.array_length {
            layout.array_length = n;
        }
        if let Some(n) = self.array_width {
            layout.array_width = n;
        }

        if let Some(name) = &self.scan {
            config.packer.scan = match OccupancyScan::from_name(name) {
                Some(scan) => scan,
                None => bail!("Unknown scan '{}' (expected bbox or exhaustive)", name),
            };
        }
        if let Some(ms) = self.time_budget_ms {
            config.packer.time_budget_ms = Some(ms);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Read a YAML configuration file. Missing keys take their defaults.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PipelineConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
