//! Mask command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use roofpack::analyze_rooftop;
use roofpack::io::{load_rgb, save_gray};
use roofpack::mask::FOREGROUND;

use super::common::ConfigArgs;

#[derive(Args, Debug, Clone)]
pub struct MaskArgs {
    /// Input image
    pub image: PathBuf,

    /// Where to write the mask (255 = rooftop)
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Execute the mask command.
pub fn cmd_mask(args: &MaskArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let source = load_rgb(&args.image)?;
    let analysis = analyze_rooftop(&source, &config.mask)
        .with_context(|| format!("Failed to build rooftop mask for {}", args.image.display()))?;

    save_gray(&args.output, &analysis.mask)?;

    let total = u64::from(analysis.mask.width()) * u64::from(analysis.mask.height());
    let rooftop = analysis.mask.pixels().filter(|p| p.0[0] == FOREGROUND).count();
    println!(
        "{}: {} of {} pixels marked as rooftop, mask written to {}",
        args.image.display(),
        rooftop,
        total,
        args.output.display()
    );
    Ok(())
}
