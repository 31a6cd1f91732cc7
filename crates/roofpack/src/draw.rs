//! Drawing helpers on top of `imageproc`.
//!
//! Works on any `imageproc` canvas, so the same code stamps the grayscale
//! working buffer and the color output buffer.

use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut, Canvas};
use imageproc::point::Point as PixelPoint;

use crate::geometry::{Footprint, Point};

/// Draw `points` as a closed 1px outline.
pub fn draw_closed_outline<C>(canvas: &mut C, points: &[Point], color: C::Pixel)
where
    C: Canvas,
    C::Pixel: 'static,
{
    let n = points.len();
    if n == 0 {
        return;
    }

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}

/// Fill a footprint, boundary included.
///
/// `draw_polygon_mut` refuses rings whose first and last vertex coincide,
/// which truncation can produce for very thin footprints, so duplicates are
/// dropped first. Anything with fewer than three distinct corners has no
/// area and is skipped.
pub fn fill_footprint<C>(canvas: &mut C, footprint: &Footprint, color: C::Pixel)
where
    C: Canvas,
    C::Pixel: 'static,
{
    let mut ring: Vec<PixelPoint<i32>> = footprint
        .corners
        .iter()
        .map(|c| PixelPoint::new(c.x, c.y))
        .collect();
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return;
    }

    draw_polygon_mut(canvas, &ring, color);
}

/// Outline a footprint (1px).
pub fn outline_footprint<C>(canvas: &mut C, footprint: &Footprint, color: C::Pixel)
where
    C: Canvas,
    C::Pixel: 'static,
{
    let corners: Vec<Point> = footprint.corners.iter().map(|c| c.to_point()).collect();
    draw_closed_outline(canvas, &corners, color);
}
