//! Pack command implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use roofpack::io::{load_rgb, save_gray, save_rgb};
use roofpack::{analyze_rooftop, pack_mask, PipelineConfig, RooftopAnalysis};

use super::common::ConfigArgs;

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Input images
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Directory for annotated output images
    #[arg(short, long, default_value = "packed")]
    pub output: PathBuf,

    /// Also write the intermediate rasters of each image here
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Print one JSON report per image instead of the summary line
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Per-image JSON report: counts only, no panel geometry.
#[derive(Serialize)]
struct PackReport {
    image: String,
    output: String,
    panels: usize,
    footprints: usize,
    candidates: usize,
    sweeps: u32,
    truncated: bool,
    elapsed_ms: u128,
}

/// Execute the pack command.
///
/// Images are independent: each gets its own session, and one failing image
/// does not stop the rest of the batch.
pub fn cmd_pack(args: &PackArgs) -> Result<()> {
    let config = args.config.resolve()?;
    let mut failed = 0usize;

    for image in &args.images {
        if let Err(err) = pack_one(image, args, &config) {
            eprintln!("Error: {}: {:#}", image.display(), err);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} images failed", failed, args.images.len());
    }
    Ok(())
}

fn pack_one(image: &Path, args: &PackArgs, config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();
    let name = display_name(image);

    let source = load_rgb(image)?;
    let analysis = analyze_rooftop(&source, &config.mask)
        .with_context(|| format!("Failed to build rooftop mask for {}", name))?;

    if let Some(dir) = &args.debug_dir {
        write_debug_rasters(dir, image, &analysis)?;
    }

    let session = pack_mask(&analysis.mask, &source, config)?;
    let out_path = args.output.join(&name);
    save_rgb(&out_path, session.output())?;

    let elapsed = start.elapsed();
    log::info!("{}: {} panels in {:?}", name, session.panel_count(), elapsed);

    if args.json {
        let report = PackReport {
            image: image.display().to_string(),
            output: out_path.display().to_string(),
            panels: session.panel_count(),
            footprints: session.footprints().len(),
            candidates: session.candidates_tested(),
            sweeps: session.sweeps_completed(),
            truncated: session.is_truncated(),
            elapsed_ms: elapsed.as_millis(),
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{} individual solar panels placed in {}", session.panel_count(), name);
        if session.is_truncated() {
            eprintln!("Warning: time budget ran out for {}; result is partial", name);
        }
    }

    Ok(())
}

/// Dump every intermediate raster as `<stem>_<stage>.png`.
fn write_debug_rasters(dir: &Path, image: &Path, analysis: &RooftopAnalysis) -> Result<()> {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let stages = [
        ("gray", &analysis.gray),
        ("sharpened", &analysis.sharpened),
        ("edges", &analysis.edges),
        ("threshold", &analysis.threshold),
        ("threshold_polygons", &analysis.threshold_polygons),
        ("edge_polygons", &analysis.edge_polygons),
        ("mask", &analysis.mask),
    ];

    for (stage, raster) in stages {
        save_gray(&dir.join(format!("{}_{}.png", stem, stage)), raster)?;
    }
    log::debug!("wrote debug rasters for {} to {}", stem, dir.display());
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
