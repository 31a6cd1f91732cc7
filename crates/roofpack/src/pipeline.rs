//! End-to-end pipeline: source image in, packed rooftop out.
//!
//! ```text
//! RGB ─▶ gray ─▶ sharpen ─┬─▶ canny ──────────────┬─▶ edge contours ─┐
//!                         │                       │                  ├─▶ AND ─▶ mask
//!                         └─▶ otsu ─▶ contours ───┴─▶ (support) ─────┘
//!
//! mask ─▶ pyr_up ─▶ working ─┐
//! RGB  ─▶ pyr_up ─▶ output ──┴─▶ pack ─▶ PackingSession
//! ```

use image::{GrayImage, RgbImage};

use crate::config::{MaskConfig, PipelineConfig};
use crate::error::Result;
use crate::mask::{compose, polygon_raster};
use crate::pack::{pack, PackingSession};
use crate::pyramid::pyr_up;
use crate::vision::{canny, find_polygons, grayscale, otsu_binary, sharpen};

/// Every intermediate raster of the mask stage.
///
/// Only `mask` is needed for packing; the rest is kept around so the CLI can
/// dump it for debugging.
#[derive(Debug, Clone)]
pub struct RooftopAnalysis {
    pub gray: GrayImage,
    pub sharpened: GrayImage,
    pub edges: GrayImage,
    pub threshold: GrayImage,
    /// Outlines from the threshold contours (black on white)
    pub threshold_polygons: GrayImage,
    /// Outlines from the edge contours (black on white)
    pub edge_polygons: GrayImage,
    /// Rooftop mask: 255 where neither raster has an outline
    pub mask: GrayImage,
}

/// Build the rooftop mask for one source image.
pub fn analyze_rooftop(source: &RgbImage, config: &MaskConfig) -> Result<RooftopAnalysis> {
    let gray = grayscale(source);
    let sharpened = sharpen(&gray, &config.smoothing);
    let edges = canny(&sharpened, config.canny_low, config.canny_high);
    let threshold = otsu_binary(&sharpened);

    let threshold_contours = find_polygons(&threshold);
    let edge_contours = find_polygons(&edges);

    let (threshold_polygons, kept_threshold) =
        polygon_raster(&threshold_contours, &edges, &config.threshold_filter);
    let (edge_polygons, kept_edges) = polygon_raster(&edge_contours, &edges, &config.edge_filter);

    log::info!(
        "mask: {} threshold contours ({} kept), {} edge contours ({} kept)",
        threshold_contours.len(),
        kept_threshold,
        edge_contours.len(),
        kept_edges
    );

    let mask = compose(&threshold_polygons, &edge_polygons)?;

    Ok(RooftopAnalysis {
        gray,
        sharpened,
        edges,
        threshold,
        threshold_polygons,
        edge_polygons,
        mask,
    })
}

/// Pack panels onto an existing mask.
///
/// Both the mask and the source are upsampled 2x first; the returned
/// session's buffers are at that doubled resolution.
pub fn pack_mask(mask: &GrayImage, source: &RgbImage, config: &PipelineConfig) -> Result<PackingSession> {
    config.validate()?;

    let working = pyr_up(mask);
    let output = pyr_up(source);
    log::debug!(
        "packing on {}x{} working buffer",
        working.width(),
        working.height()
    );

    let session = PackingSession::new(working, output)?;
    pack(session, &config.layout, &config.packer)
}

/// Run the whole pipeline on one image with a fresh session.
pub fn place_panels(source: &RgbImage, config: &PipelineConfig) -> Result<PackingSession> {
    config.validate()?;
    let analysis = analyze_rooftop(source, &config.mask)?;
    pack_mask(&analysis.mask, source, config)
}

// ============================================================================
// TESTS
// ============================================================================
