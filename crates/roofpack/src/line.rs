//! Integer line rasterization over a grayscale buffer.
//!
//! Produces the grid cells a segment crosses together with the buffer
//! value at each one. Both the packer's edge check and its separator
//! placement index into this sequence, so coverage must be exact: exactly
//! one cell per unit step along the dominant axis, no gaps, no repeats.
//!
//! The start point itself is NOT part of the sequence; the end point is.
//! A segment from `p` to `p` therefore yields nothing.

use image::GrayImage;

use crate::geometry::GridPoint;

/// One rasterized cell: its coordinates and the buffer value there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSample {
    pub x: i32,
    pub y: i32,
    pub value: u8,
}

/// How the minor coordinate is derived for each step.
#[derive(Debug, Clone, Copy)]
enum Stepping {
    /// Same x everywhere, step along y.
    Vertical,
    /// Same y everywhere, step along x.
    Horizontal,
    /// |dy| > |dx|: step y, x = trunc(slope * offset) + x0 with slope = dx/dy.
    Steep { slope: f64 },
    /// |dx| >= |dy|: step x, y = trunc(slope * offset) + y0 with slope = dy/dx.
    Shallow { slope: f64 },
}

/// Lazy iterator over the cells of one segment.
///
/// ## Rust Lesson #22: Implementing Iterator
///
/// Anything with a `next(&mut self) -> Option<Item>` method is an
/// iterator and gets `map`, `filter`, `collect`, `count`... for free.
/// The iterator borrows the buffer (`'a`) so it can read sample values
/// without copying the image.
///
/// It is single-pass: once exhausted it stays exhausted. Build a new one
/// (or call [`rasterize_line`] again) to walk the segment a second time.
pub struct LineIter<'a> {
    buffer: &'a GrayImage,
    start: GridPoint,
    step_x: i32,
    step_y: i32,
    stepping: Stepping,
    steps: u32,
    next_step: u32,
}

impl<'a> LineIter<'a> {
    /// Prepare the walk from `p1` toward `p2` over `buffer`.
    pub fn new(p1: GridPoint, p2: GridPoint, buffer: &'a GrayImage) -> Self {
        let dx = i64::from(p2.x) - i64::from(p1.x);
        let dy = i64::from(p2.y) - i64::from(p1.y);
        let steps = dx.unsigned_abs().max(dy.unsigned_abs()) as u32;

        let stepping = if dx == 0 {
            Stepping::Vertical
        } else if dy == 0 {
            Stepping::Horizontal
        } else if dy.abs() > dx.abs() {
            Stepping::Steep { slope: dx as f64 / dy as f64 }
        } else {
            Stepping::Shallow { slope: dy as f64 / dx as f64 }
        };

        Self {
            buffer,
            start: p1,
            step_x: dx.signum() as i32,
            step_y: dy.signum() as i32,
            stepping,
            steps,
            next_step: 1,
        }
    }

    /// Cell for step `i` (1-based), before clipping.
    #[inline]
    fn cell(&self, i: u32) -> (i64, i64) {
        let i = i64::from(i);
        let x0 = i64::from(self.start.x);
        let y0 = i64::from(self.start.y);

        match self.stepping {
            Stepping::Vertical => (x0, y0 + i64::from(self.step_y) * i),
            Stepping::Horizontal => (x0 + i64::from(self.step_x) * i, y0),
            Stepping::Steep { slope } => {
                let offset = i64::from(self.step_y) * i;
                ((slope * offset as f64) as i64 + x0, y0 + offset)
            }
            Stepping::Shallow { slope } => {
                let offset = i64::from(self.step_x) * i;
                (x0 + offset, (slope * offset as f64) as i64 + y0)
            }
        }
    }
}

impl Iterator for LineIter<'_> {
    type Item = LineSample;

    fn next(&mut self) -> Option<LineSample> {
        let (width, height) = self.buffer.dimensions();

        while self.next_step <= self.steps {
            let (x, y) = self.cell(self.next_step);
            self.next_step += 1;

            // Clip silently: cells off the buffer are simply skipped
            if x >= 0 && y >= 0 && x < i64::from(width) && y < i64::from(height) {
                let value = self.buffer.get_pixel(x as u32, y as u32).0[0];
                return Some(LineSample { x: x as i32, y: y as i32, value });
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps + 1).saturating_sub(self.next_step) as usize;
        (0, Some(remaining))
    }
}

/// Rasterize the segment `p1` -> `p2` and collect its samples.
pub fn rasterize_line(p1: GridPoint, p2: GridPoint, buffer: &GrayImage) -> Vec<LineSample> {
    LineIter::new(p1, p2, buffer).collect()
}

// ============================================================================
// TESTS
// ============================================================================
