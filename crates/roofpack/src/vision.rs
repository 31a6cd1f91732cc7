//! Image-processing collaborators.
//!
//! Thin wrappers around `image` / `imageproc` that turn a source photo into
//! the inputs the mask compositor needs: an edge map, a binary threshold
//! image, and the contours traced from each.

use image::{imageops, GrayImage, RgbImage};
use imageproc::contours::find_contours;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::bilateral_filter;
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Polygon};

/// 3x3 sharpening kernel applied after smoothing (weights sum to 1).
pub const SHARPEN_KERNEL: [f32; 9] = [
    -2.0, -2.0, -2.0,
    -2.0, 17.0, -2.0,
    -2.0, -2.0, -2.0,
];

/// Luma conversion of the source image.
pub fn grayscale(image: &RgbImage) -> GrayImage {
    imageops::grayscale(image)
}

/// Edge-preserving smoothing applied before sharpening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilateralSmoothing {
    /// Window side in pixels (0 disables smoothing)
    pub window_size: u32,
    /// Intensity difference that still counts as "similar"
    pub sigma_color: f32,
    /// Spatial falloff inside the window
    pub sigma_spatial: f32,
}

impl Default for BilateralSmoothing {
    fn default() -> Self {
        Self {
            window_size: 5,
            sigma_color: 7.0,
            sigma_spatial: 5.0,
        }
    }
}

impl BilateralSmoothing {
    /// No smoothing at all; `sharpen` only applies the kernel.
    pub const OFF: Self = Self {
        window_size: 0,
        sigma_color: 0.0,
        sigma_spatial: 0.0,
    };
}

/// Smooth away texture, then sharpen what is left.
///
/// Roof tiles, gravel and shingles produce a lot of fine texture; the
/// bilateral filter flattens it without softening real boundaries, and the
/// sharpening kernel then restores contrast across them so Canny and Otsu
/// both see them.
pub fn sharpen(gray: &GrayImage, smoothing: &BilateralSmoothing) -> GrayImage {
    let smoothed = if smoothing.window_size > 0 {
        bilateral_filter(
            gray,
            smoothing.window_size,
            smoothing.sigma_color,
            smoothing.sigma_spatial,
        )
    } else {
        gray.clone()
    };

    let (width, height) = smoothed.dimensions();
    if width < 3 || height < 3 {
        return smoothed;
    }

    // filter3x3 only writes the interior; carry the 1px frame over from the
    // smoothed image so it does not read as a black border to Canny
    let mut sharp: GrayImage = imageops::filter3x3(&smoothed, &SHARPEN_KERNEL);
    for x in 0..width {
        sharp.put_pixel(x, 0, *smoothed.get_pixel(x, 0));
        sharp.put_pixel(x, height - 1, *smoothed.get_pixel(x, height - 1));
    }
    for y in 0..height {
        sharp.put_pixel(0, y, *smoothed.get_pixel(0, y));
        sharp.put_pixel(width - 1, y, *smoothed.get_pixel(width - 1, y));
    }
    sharp
}

/// Canny edge map: 255 on edges, 0 elsewhere.
pub fn canny(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    imageproc::edges::canny(gray, low, high)
}

/// Otsu binarization: pixels above the Otsu level become 255.
pub fn otsu_binary(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    log::debug!("otsu level {}", level);
    threshold(gray, level, ThresholdType::Binary)
}

/// Trace every border in a binary image (outer borders and holes alike).
///
/// Non-zero pixels are foreground. Each border becomes one polygon holding
/// only the pixels where the trace changes direction: straight horizontal,
/// vertical and diagonal runs collapse to their end points, so a clean
/// rectangle comes back as its four corners.
pub fn find_polygons(binary: &GrayImage) -> Vec<Polygon> {
    find_contours::<i32>(binary)
        .into_iter()
        .map(|contour| {
            Polygon::new(
                compress_runs(&contour.points)
                    .into_iter()
                    .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                    .collect(),
            )
        })
        .collect()
}

/// Keep the points of a closed pixel chain where the step direction changes.
fn compress_runs(chain: &[PixelPoint<i32>]) -> Vec<PixelPoint<i32>> {
    let mut chain = chain.to_vec();
    chain.dedup();
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }

    let n = chain.len();
    if n < 3 {
        return chain;
    }

    let step = |a: PixelPoint<i32>, b: PixelPoint<i32>| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let next = chain[(i + 1) % n];
            step(prev, chain[i]) != step(chain[i], next)
        })
        .map(|i| chain[i])
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{polygon_raster, ContourFilter};
    use image::{Luma, Rgb};

    /// Dark background with a bright filled rectangle.
    fn bright_block() -> GrayImage {
        GrayImage::from_fn(60, 60, |x, y| {
            let inside = (15..45).contains(&x) && (20..40).contains(&y);
            Luma([if inside { 220 } else { 30 }])
        })
    }

    #[test]
    fn blank_image_has_no_edges() {
        let flat = GrayImage::from_pixel(32, 32, Luma([128]));
        assert!(canny(&flat, 180.0, 240.0).pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn block_boundary_shows_up_as_edges() {
        let edges = canny(&bright_block(), 50.0, 100.0);
        assert!(edges.pixels().any(|p| p.0[0] == 255));
        assert_eq!(edges.get_pixel(30, 30).0[0], 0);
        assert_eq!(edges.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn otsu_separates_block_from_background() {
        let binary = otsu_binary(&bright_block());
        assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!(binary.get_pixel(30, 30).0[0], 255);
        assert_eq!(binary.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn block_traces_to_a_large_polygon() {
        let polygons = find_polygons(&otsu_binary(&bright_block()));
        assert!(!polygons.is_empty());
        let largest = polygons.iter().map(|p| p.area()).fold(0.0, f64::max);
        // 30x20 block traced through pixel centers: 29x19
        assert!(largest > 500.0, "largest polygon area {}", largest);
    }

    #[test]
    fn empty_binary_has_no_contours() {
        assert!(find_polygons(&GrayImage::new(16, 16)).is_empty());
    }

    #[test]
    fn filled_rectangle_traces_to_its_corners() {
        let binary = GrayImage::from_fn(60, 60, |x, y| {
            let inside = (10..50).contains(&x) && (15..45).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        });
        let polygons = find_polygons(&binary);
        assert_eq!(polygons.len(), 1);

        let mut corners: Vec<(i64, i64)> =
            polygons[0].outer.iter().map(|p| (p.x as i64, p.y as i64)).collect();
        corners.sort();
        assert_eq!(corners, vec![(10, 15), (10, 44), (49, 15), (49, 44)]);
    }

    #[test]
    fn four_corner_contour_fails_default_support_filter() {
        let binary = GrayImage::from_fn(60, 60, |x, y| {
            let inside = (10..50).contains(&x) && (15..45).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        });
        // Every vertex is supported, but four is not more than ten
        let edges = GrayImage::from_pixel(60, 60, Luma([255]));
        let contours = find_polygons(&binary);

        let (raster, kept) = polygon_raster(&contours, &edges, &ContourFilter::THRESHOLD);
        assert_eq!(kept, 0);
        assert!(raster.pixels().all(|p| p.0[0] == 255));
        let (_, kept) = polygon_raster(&contours, &edges, &ContourFilter::EDGE);
        assert_eq!(kept, 0);
    }

    #[test]
    fn diagonal_runs_collapse_to_turns() {
        // Diamond traced pixel by pixel: four diagonal runs
        let mut chain = Vec::new();
        for i in 0..4 {
            chain.push(PixelPoint::new(4 + i, i));
        }
        for i in 0..4 {
            chain.push(PixelPoint::new(8 - i, 4 + i));
        }
        for i in 0..4 {
            chain.push(PixelPoint::new(4 - i, 8 - i));
        }
        for i in 0..4 {
            chain.push(PixelPoint::new(i, 4 - i));
        }

        let turns = compress_runs(&chain);
        assert_eq!(
            turns,
            vec![
                PixelPoint::new(4, 0),
                PixelPoint::new(8, 4),
                PixelPoint::new(4, 8),
                PixelPoint::new(0, 4),
            ]
        );
    }

    #[test]
    fn short_and_repeated_chains_survive_compression() {
        let one = vec![PixelPoint::new(3, 3)];
        assert_eq!(compress_runs(&one), one);

        let repeated = vec![PixelPoint::new(3, 3); 5];
        assert_eq!(compress_runs(&repeated), one);
    }

    #[test]
    fn sharpen_keeps_flat_regions_flat() {
        let flat = GrayImage::from_pixel(16, 16, Luma([90]));
        let sharp = sharpen(&flat, &BilateralSmoothing::OFF);
        assert_eq!(sharp.get_pixel(8, 8).0[0], 90);
        assert_eq!(sharp.get_pixel(0, 0).0[0], 90);
        assert_eq!(sharp.get_pixel(15, 7).0[0], 90);

        assert_eq!(sharpen(&flat, &BilateralSmoothing::default()).dimensions(), (16, 16));
    }

    #[test]
    fn bilateral_smoothing_keeps_a_step_edge() {
        let step = GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 40 } else { 200 }]));
        let smoothed = sharpen(&step, &BilateralSmoothing::default());
        // Far from the step both sides stay clearly apart
        assert!(smoothed.get_pixel(4, 10).0[0] < 100);
        assert!(smoothed.get_pixel(15, 10).0[0] > 150);
    }

    #[test]
    fn tiny_images_skip_the_kernel() {
        let tiny = GrayImage::from_pixel(2, 2, Luma([40]));
        assert_eq!(sharpen(&tiny, &BilateralSmoothing::OFF), tiny);
    }

    #[test]
    fn grayscale_matches_dimensions() {
        let rgb = RgbImage::from_pixel(7, 5, Rgb([200, 10, 10]));
        assert_eq!(grayscale(&rgb).dimensions(), (7, 5));
    }
}
