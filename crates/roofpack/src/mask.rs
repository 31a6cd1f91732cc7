//! Rooftop mask composition.
//!
//! Two boundary estimates are built independently, one from the contours of
//! an Otsu-thresholded image and one from the contours of a Canny edge map.
//! Each becomes a raster of closed outlines drawn in black on white. The
//! rooftop mask is their logical AND: a pixel stays foreground only if
//! neither estimate put a boundary through it.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::draw::draw_closed_outline;
use crate::error::{Result, RoofError};
use crate::geometry::{Point, Polygon};

/// Pixel value meaning "rooftop" in masks and "edge" in edge maps.
pub const FOREGROUND: u8 = 255;

/// Pixel value used for drawn outlines and consumed territory.
pub const BACKGROUND: u8 = 0;

/// Filter deciding which contours make it into a polygon raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourFilter {
    /// Contours whose enclosed area is not above this are dropped
    pub min_area: f64,
    /// Contours need more than this many vertices sitting on edge pixels
    pub min_vertex_support: usize,
}

impl ContourFilter {
    /// Defaults for contours traced from the thresholded image.
    pub const THRESHOLD: Self = Self { min_area: 5.0, min_vertex_support: 10 };

    /// Defaults for contours traced from the edge map.
    pub const EDGE: Self = Self { min_area: 10.0, min_vertex_support: 10 };

    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_min_vertex_support(mut self, min_vertex_support: usize) -> Self {
        self.min_vertex_support = min_vertex_support;
        self
    }
}

impl Default for ContourFilter {
    fn default() -> Self {
        Self::THRESHOLD
    }
}

/// Vertices of `contour` that land on a foreground pixel of `edges`.
///
/// Vertices outside the edge map count as unsupported.
pub fn supported_vertices(contour: &Polygon, edges: &GrayImage) -> Vec<Point> {
    let (width, height) = edges.dimensions();

    contour
        .outer
        .iter()
        .copied()
        .filter(|p| {
            let (x, y) = (p.x as i64, p.y as i64);
            x >= 0
                && y >= 0
                && x < i64::from(width)
                && y < i64::from(height)
                && edges.get_pixel(x as u32, y as u32).0[0] == FOREGROUND
        })
        .collect()
}

/// Build a polygon raster from traced contours.
///
/// The canvas matches `edges` in size and starts fully foreground. For each
/// contour that passes `filter`, its edge-supported vertices are drawn as a
/// closed outline in [`BACKGROUND`]. Returns the raster and the number of
/// contours that were kept.
pub fn polygon_raster(
    contours: &[Polygon],
    edges: &GrayImage,
    filter: &ContourFilter,
) -> (GrayImage, usize) {
    let (width, height) = edges.dimensions();
    let mut canvas = GrayImage::from_pixel(width, height, Luma([FOREGROUND]));
    let mut kept = 0;

    for contour in contours {
        if contour.area() <= filter.min_area {
            continue;
        }

        let support = supported_vertices(contour, edges);
        if support.len() <= filter.min_vertex_support {
            continue;
        }

        draw_closed_outline(&mut canvas, &support, Luma([BACKGROUND]));
        kept += 1;
    }

    log::debug!(
        "polygon raster: kept {} of {} contours (min_area {}, min_support {})",
        kept,
        contours.len(),
        filter.min_area,
        filter.min_vertex_support
    );

    (canvas, kept)
}

/// Elementwise logical AND of two rasters.
///
/// A pixel is foreground in the result iff it is non-zero in both inputs.
pub fn compose(a: &GrayImage, b: &GrayImage) -> Result<GrayImage> {
    if a.dimensions() != b.dimensions() {
        return Err(RoofError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    let (width, height) = a.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let both = a.get_pixel(x, y).0[0] != 0 && b.get_pixel(x, y).0[0] != 0;
        Luma([if both { FOREGROUND } else { BACKGROUND }])
    }))
}

// ============================================================================
// TESTS
// ============================================================================
