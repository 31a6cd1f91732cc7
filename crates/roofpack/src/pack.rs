//! Panel packing.
//!
//! Tiles a rotated grid of panel-array footprints over the working buffer,
//! keeps the ones that sit entirely on rooftop pixels, and renders them into
//! the output buffer with one separator line per placed panel.
//!
//! # Algorithm
//!
//! 1. Start with `series = array_length`; sweep while `series >= 2`
//! 2. Walk columns (outer, stride `unit_length + 1`) and rows (inner, stride
//!    `unit_width + 1`)
//! 3. Cut a patch of `(unit_width + 1) * array_width + 1` rows by
//!    `unit_length * series + 3` columns (clipped at the buffer edge), rotate
//!    its corners about the patch center
//! 4. Reject unless every rotated corner is strictly positive
//! 5. Reject unless every pixel strictly inside the footprint is foreground
//! 6. Rasterize the two long edges; reject unless both are long enough
//! 7. Commit: consume the footprint in the working buffer, draw it in the
//!    output, connect every `separator_stride`-th pair of edge samples
//! 8. Decrement `series` and sweep again
//!
//! Commits happen immediately, so later candidates (in the same sweep or
//! later ones) see consumed territory as background and cannot overlap.

use std::time::{Duration, Instant};

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use serde::{Deserialize, Serialize};

use crate::draw::{fill_footprint, outline_footprint};
use crate::error::{Result, RoofError};
use crate::geometry::{footprint_corners, rotate_points, Footprint, Point};
use crate::line::{rasterize_line, LineSample};
use crate::mask::{BACKGROUND, FOREGROUND};

/// Color of outlines and separator lines in the output.
const SEPARATOR_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Panel geometry: how many units make an array and how big a unit is.
///
/// Lengths run along the footprint's long edges (before rotation, the x
/// axis); widths run across them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    /// Units along the long edge in the first sweep (shrinks per sweep)
    pub array_length: u32,
    /// Units across the long edge
    pub array_width: u32,
    /// Unit length in pixels of the working buffer
    pub unit_length: u32,
    /// Unit width in pixels of the working buffer
    pub unit_width: u32,
    /// Placement angle in degrees
    pub angle_degrees: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            array_length: 4,
            array_width: 1,
            unit_length: 8,
            unit_width: 5,
            angle_degrees: 30.0,
        }
    }
}

impl PanelLayout {
    pub fn with_angle(mut self, angle_degrees: f64) -> Self {
        self.angle_degrees = angle_degrees;
        self
    }

    pub fn with_unit(mut self, unit_length: u32, unit_width: u32) -> Self {
        self.unit_length = unit_length;
        self.unit_width = unit_width;
        self
    }

    pub fn with_array(mut self, array_length: u32, array_width: u32) -> Self {
        self.array_length = array_length;
        self.array_width = array_width;
        self
    }

    /// Reject layouts that would stall or degenerate the sweep.
    pub fn validate(&self) -> Result<()> {
        if self.unit_length == 0 || self.unit_width == 0 {
            return Err(RoofError::InvalidLayout(format!(
                "unit size must be non-zero, got {}x{}",
                self.unit_length, self.unit_width
            )));
        }
        if self.array_width == 0 {
            return Err(RoofError::InvalidLayout("array width must be non-zero".into()));
        }
        if !self.angle_degrees.is_finite() {
            return Err(RoofError::InvalidLayout(format!(
                "angle must be finite, got {}",
                self.angle_degrees
            )));
        }
        Ok(())
    }

    /// Number of sweeps this layout runs (array sizes `array_length` down to 2).
    pub fn sweep_count(&self) -> u32 {
        self.array_length.saturating_sub(1)
    }
}

/// Which pixels the occupancy test looks at.
///
/// Both variants accept exactly the same footprints: a pixel outside the
/// footprint's bounding box can never be strictly inside it. `Exhaustive`
/// walks the whole buffer per candidate and is only worth running to
/// cross-check `BoundingBox`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OccupancyScan {
    #[default]
    BoundingBox,
    Exhaustive,
}

impl OccupancyScan {
    /// Parse from a CLI-style name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bbox" | "bounding-box" | "boundingbox" => Some(Self::BoundingBox),
            "exhaustive" | "full" => Some(Self::Exhaustive),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BoundingBox => "bounding-box",
            Self::Exhaustive => "exhaustive",
        }
    }
}

/// Knobs of the acceptance test and the rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerOptions {
    /// Both long edges need more than this many rasterized samples
    pub min_edge_samples: usize,
    /// Every n-th edge sample anchors a separator line
    pub separator_stride: usize,
    /// Fill color of placed footprints in the output (RGB)
    pub marker: [u8; 3],
    /// Occupancy scan region
    pub scan: OccupancyScan,
    /// Stop packing once this much wall time has passed (None = no limit)
    pub time_budget_ms: Option<u64>,
}

impl Default for PackerOptions {
    fn default() -> Self {
        Self {
            min_edge_samples: 10,
            separator_stride: 5,
            marker: [0, 0, 255],
            scan: OccupancyScan::BoundingBox,
            time_budget_ms: None,
        }
    }
}

impl PackerOptions {
    pub fn with_scan(mut self, scan: OccupancyScan) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_ms = Some(budget.as_millis() as u64);
        self
    }

    pub fn with_marker(mut self, marker: [u8; 3]) -> Self {
        self.marker = marker;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.separator_stride == 0 {
            return Err(RoofError::InvalidLayout("separator stride must be non-zero".into()));
        }
        Ok(())
    }

    fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Everything one image's packing run owns.
///
/// ## Rust Lesson #23: Ownership as lifecycle
///
/// The session owns both buffers and the counter. `pack` takes it by value
/// and hands it back, so there is no way for two images to share a counter
/// or a half-consumed working buffer: each image builds its own session and
/// drops it when done.
#[derive(Debug, Clone)]
pub struct PackingSession {
    working: GrayImage,
    output: RgbImage,
    panel_count: usize,
    footprints: Vec<Footprint>,
    candidates_tested: usize,
    sweeps_completed: u32,
    truncated: bool,
}

impl PackingSession {
    /// Start a session. Both buffers must have the same dimensions.
    pub fn new(working: GrayImage, output: RgbImage) -> Result<Self> {
        if working.dimensions() != output.dimensions() {
            return Err(RoofError::DimensionMismatch {
                left: working.dimensions(),
                right: output.dimensions(),
            });
        }

        Ok(Self {
            working,
            output,
            panel_count: 0,
            footprints: Vec::new(),
            candidates_tested: 0,
            sweeps_completed: 0,
            truncated: false,
        })
    }

    /// Panels placed so far. Never decreases.
    pub fn panel_count(&self) -> usize {
        self.panel_count
    }

    /// Footprints accepted so far, in commit order.
    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    /// Grid positions evaluated so far (all sweeps).
    pub fn candidates_tested(&self) -> usize {
        self.candidates_tested
    }

    /// Sweeps that ran to completion.
    pub fn sweeps_completed(&self) -> u32 {
        self.sweeps_completed
    }

    /// True if a time budget cut packing short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The working buffer, with consumed territory zeroed.
    pub fn working(&self) -> &GrayImage {
        &self.working
    }

    /// The rendered output.
    pub fn output(&self) -> &RgbImage {
        &self.output
    }

    /// Give up the session and keep the rendered output.
    pub fn into_output(self) -> RgbImage {
        self.output
    }

    /// Consume and render one accepted footprint.
    fn commit(
        &mut self,
        footprint: Footprint,
        edge_a: &[LineSample],
        edge_b: &[LineSample],
        options: &PackerOptions,
    ) {
        fill_footprint(&mut self.working, &footprint, Luma([BACKGROUND]));
        // The fill covers the boundary too, so the outline goes on top of it
        fill_footprint(&mut self.output, &footprint, Rgb(options.marker));
        outline_footprint(&mut self.output, &footprint, SEPARATOR_COLOR);

        let stride = options.separator_stride;
        let anchors_a = edge_a.iter().skip(stride).step_by(stride);
        let anchors_b = edge_b.iter().skip(stride).step_by(stride);

        for (a, b) in anchors_a.zip(anchors_b) {
            draw_line_segment_mut(
                &mut self.output,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                SEPARATOR_COLOR,
            );
            self.panel_count += 1;
        }

        log::trace!(
            "committed footprint {:?}, panel count now {}",
            footprint.corners,
            self.panel_count
        );
        self.footprints.push(footprint);
    }
}

// ============================================================================
// PACKING
// ============================================================================

/// Footprint for the grid cell at (`col`, `row`) in a sweep of array size
/// `series`, rotated about its own center.
pub fn candidate_footprint(
    col: u32,
    row: u32,
    series: u32,
    layout: &PanelLayout,
    buffer_size: (u32, u32),
) -> Footprint {
    let (cols, rows) = buffer_size;

    let patch_h = (u64::from(layout.unit_width) + 1) * u64::from(layout.array_width) + 1;
    let patch_w = u64::from(layout.unit_length) * u64::from(series) + 3;
    let patch_h = patch_h.min(u64::from(rows.saturating_sub(row))) as f64;
    let patch_w = patch_w.min(u64::from(cols.saturating_sub(col))) as f64;

    let (x, y) = (f64::from(col), f64::from(row));
    let corners = footprint_corners(x, y, patch_w, patch_h);
    let center = Point::new(x + patch_w / 2.0, y + patch_h / 2.0);
    let rotated = rotate_points(center, &corners, layout.angle_degrees);

    Footprint::from_points([rotated[0], rotated[1], rotated[2], rotated[3]])
}

/// True iff the footprint has at least one strictly-interior pixel and all
/// of them are foreground in `working`.
///
/// "Mean equals 255" over u8 samples is the same statement as "every sample
/// is 255", so the scan stops at the first non-foreground member.
pub fn is_fully_occupied(working: &GrayImage, footprint: &Footprint, scan: OccupancyScan) -> bool {
    let (width, height) = working.dimensions();
    if width == 0 || height == 0 {
        return false;
    }

    let (x0, y0, x1, y1) = match scan {
        OccupancyScan::Exhaustive => (0, 0, i64::from(width) - 1, i64::from(height) - 1),
        OccupancyScan::BoundingBox => {
            let (min_x, min_y, max_x, max_y) = footprint.bounding_box();
            (
                i64::from(min_x).max(0),
                i64::from(min_y).max(0),
                i64::from(max_x).min(i64::from(width) - 1),
                i64::from(max_y).min(i64::from(height) - 1),
            )
        }
    };

    let polygon = footprint.polygon();
    let mut members = 0usize;

    for y in y0..=y1 {
        for x in x0..=x1 {
            if !polygon.contains_strictly(x as f64, y as f64) {
                continue;
            }
            if working.get_pixel(x as u32, y as u32).0[0] != FOREGROUND {
                return false;
            }
            members += 1;
        }
    }

    // No members means nothing to average: reject
    members > 0
}

/// Run every sweep of `layout` over the session's working buffer.
///
/// The session comes back with its counter, footprints and both buffers
/// updated. Call it once per image with a fresh session.
pub fn pack(
    mut session: PackingSession,
    layout: &PanelLayout,
    options: &PackerOptions,
) -> Result<PackingSession> {
    layout.validate()?;
    options.validate()?;

    let started = Instant::now();
    let budget = options.time_budget();
    let (cols, rows) = session.working.dimensions();
    let col_step = layout.unit_length as usize + 1;
    let row_step = layout.unit_width as usize + 1;

    let mut series = layout.array_length;

    'sweeps: while series >= 2 {
        let placed_before = session.panel_count;
        let accepted_before = session.footprints.len();

        for col in (0..cols).step_by(col_step) {
            for row in (0..rows).step_by(row_step) {
                if let Some(budget) = budget {
                    if started.elapsed() >= budget {
                        log::warn!(
                            "time budget of {:?} exhausted during sweep with array size {}; stopping",
                            budget,
                            series
                        );
                        session.truncated = true;
                        break 'sweeps;
                    }
                }

                session.candidates_tested += 1;

                let footprint = candidate_footprint(col, row, series, layout, (cols, rows));
                if !footprint.is_strictly_positive() {
                    continue;
                }
                if !is_fully_occupied(&session.working, &footprint, options.scan) {
                    continue;
                }

                let [(a0, a1), (b0, b1)] = footprint.long_edges();
                let edge_a = rasterize_line(a0, a1, &session.working);
                let edge_b = rasterize_line(b0, b1, &session.working);
                if edge_a.len() <= options.min_edge_samples
                    || edge_b.len() <= options.min_edge_samples
                {
                    continue;
                }

                session.commit(footprint, &edge_a, &edge_b, options);
            }
        }

        log::debug!(
            "sweep with array size {}: {} footprints, {} panels",
            series,
            session.footprints.len() - accepted_before,
            session.panel_count - placed_before
        );

        session.sweeps_completed += 1;
        series -= 1;
    }

    log::info!(
        "placed {} panels in {} footprints ({} candidates, {:?})",
        session.panel_count,
        session.footprints.len(),
        session.candidates_tested,
        started.elapsed()
    );

    Ok(session)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containment::Containment;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Black mask with a white axis-aligned square.
    fn square_mask(size: u32, offset: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = (offset..offset + side).contains(&x) && (offset..offset + side).contains(&y);
            Luma([if inside { FOREGROUND } else { BACKGROUND }])
        })
    }

    fn session_for(mask: GrayImage) -> PackingSession {
        let (w, h) = mask.dimensions();
        PackingSession::new(mask, RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))).unwrap()
    }

    fn reference_layout(angle: f64) -> PanelLayout {
        PanelLayout::default().with_unit(8, 5).with_array(4, 1).with_angle(angle)
    }

    /// Strictly interior pixels of a footprint.
    fn interior_pixels(fp: &Footprint) -> Vec<(i32, i32)> {
        let poly = fp.polygon();
        let (x0, y0, x1, y1) = fp.bounding_box();
        let mut pixels = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                if poly.classify(x as f64, y as f64) == Containment::Inside {
                    pixels.push((x, y));
                }
            }
        }
        pixels
    }

    #[test]
    fn square_rooftop_places_panels_inside() {
        init_logging();
        let mask = square_mask(200, 50, 100);
        let session = pack(session_for(mask), &reference_layout(0.0), &PackerOptions::default()).unwrap();

        assert!(session.panel_count() > 0);
        assert!(!session.footprints().is_empty());
        assert_eq!(session.sweeps_completed(), 3);

        for fp in session.footprints() {
            let (x0, y0, x1, y1) = fp.bounding_box();
            assert!(x0 >= 49 && y0 >= 49, "footprint {:?} crosses the top/left edge", fp);
            assert!(x1 <= 150 && y1 <= 150, "footprint {:?} crosses the bottom/right edge", fp);
        }
    }

    #[test]
    fn square_rooftop_is_deterministic() {
        let layout = reference_layout(0.0);
        let first = pack(session_for(square_mask(200, 50, 100)), &layout, &PackerOptions::default()).unwrap();
        let second = pack(session_for(square_mask(200, 50, 100)), &layout, &PackerOptions::default()).unwrap();
        assert_eq!(first.panel_count(), second.panel_count());
        assert_eq!(first.footprints(), second.footprints());
    }

    #[test]
    fn rotated_panels_never_leave_the_rooftop() {
        let mask = square_mask(200, 50, 100);
        let session = pack(session_for(mask), &reference_layout(30.0), &PackerOptions::default()).unwrap();

        assert!(session.panel_count() > 0);
        for fp in session.footprints() {
            for (x, y) in interior_pixels(fp) {
                assert!(
                    (50..150).contains(&x) && (50..150).contains(&y),
                    "pixel ({}, {}) of {:?} is off the rooftop",
                    x,
                    y,
                    fp
                );
            }
        }
    }

    #[test]
    fn accepted_footprints_do_not_overlap() {
        let session = pack(
            session_for(square_mask(200, 50, 100)),
            &reference_layout(30.0),
            &PackerOptions::default(),
        )
        .unwrap();

        let mut seen = std::collections::HashSet::new();
        for fp in session.footprints() {
            for px in interior_pixels(fp) {
                assert!(seen.insert(px), "pixel {:?} claimed twice", px);
            }
        }
    }

    #[test]
    fn empty_rooftop_places_nothing() {
        for angle in [0.0, 30.0, 45.0, 90.0, 137.0] {
            let mask = GrayImage::new(120, 120);
            let session = pack(session_for(mask), &reference_layout(angle), &PackerOptions::default()).unwrap();
            assert_eq!(session.panel_count(), 0, "angle {}", angle);
            assert!(session.footprints().is_empty());
        }
    }

    #[test]
    fn bounding_box_scan_matches_exhaustive_scan() {
        let layout = PanelLayout::default().with_unit(6, 3).with_array(3, 1).with_angle(30.0);
        let quick = pack(
            session_for(square_mask(80, 10, 60)),
            &layout,
            &PackerOptions::default().with_scan(OccupancyScan::BoundingBox),
        )
        .unwrap();
        let full = pack(
            session_for(square_mask(80, 10, 60)),
            &layout,
            &PackerOptions::default().with_scan(OccupancyScan::Exhaustive),
        )
        .unwrap();

        assert_eq!(quick.panel_count(), full.panel_count());
        assert_eq!(quick.footprints(), full.footprints());
    }

    #[test]
    fn packing_again_never_lowers_the_count() {
        let layout = reference_layout(0.0);
        let once = pack(session_for(square_mask(200, 50, 100)), &layout, &PackerOptions::default()).unwrap();
        let count = once.panel_count();
        let twice = pack(once, &layout, &PackerOptions::default()).unwrap();
        assert!(twice.panel_count() >= count);
    }

    #[test]
    fn consumed_territory_is_zeroed() {
        let session = pack(
            session_for(square_mask(200, 50, 100)),
            &reference_layout(0.0),
            &PackerOptions::default(),
        )
        .unwrap();

        let fp = session.footprints()[0];
        for (x, y) in interior_pixels(&fp) {
            assert_eq!(session.working().get_pixel(x as u32, y as u32).0[0], BACKGROUND);
            // Interior is marker color except where a separator crosses it
            let px = session.output().get_pixel(x as u32, y as u32).0;
            assert!(px == [0, 0, 255] || px == [0, 0, 0], "unexpected color {:?}", px);
        }
    }

    #[test]
    fn footprint_boundary_stays_black_under_the_fill() {
        let session = pack(
            session_for(square_mask(200, 50, 100)),
            &reference_layout(0.0),
            &PackerOptions::default(),
        )
        .unwrap();

        // Axis-aligned at 0 degrees, so the bounding box is the outline
        let (x0, y0, x1, y1) = session.footprints()[0].bounding_box();
        let black = [0, 0, 0];
        for x in x0..=x1 {
            assert_eq!(session.output().get_pixel(x as u32, y0 as u32).0, black, "top at x={}", x);
            assert_eq!(session.output().get_pixel(x as u32, y1 as u32).0, black, "bottom at x={}", x);
        }
        for y in y0..=y1 {
            assert_eq!(session.output().get_pixel(x0 as u32, y as u32).0, black, "left at y={}", y);
            assert_eq!(session.output().get_pixel(x1 as u32, y as u32).0, black, "right at y={}", y);
        }

        // Inside, next to the left edge, no separator reaches: marker color
        let mid_y = ((y0 + y1) / 2) as u32;
        assert_eq!(session.output().get_pixel(x0 as u32 + 1, mid_y).0, [0, 0, 255]);
    }

    #[test]
    fn single_unit_arrays_run_no_sweeps() {
        let layout = reference_layout(0.0).with_array(1, 1);
        let session = pack(session_for(square_mask(200, 50, 100)), &layout, &PackerOptions::default()).unwrap();
        assert_eq!(session.sweeps_completed(), 0);
        assert_eq!(session.panel_count(), 0);
        assert_eq!(layout.sweep_count(), 0);
    }

    #[test]
    fn zero_budget_stops_immediately() {
        let options = PackerOptions::default().with_time_budget(Duration::ZERO);
        let session = pack(session_for(square_mask(200, 50, 100)), &reference_layout(0.0), &options).unwrap();
        assert!(session.is_truncated());
        assert_eq!(session.panel_count(), 0);
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let result = PackingSession::new(GrayImage::new(10, 10), RgbImage::new(10, 11));
        assert!(matches!(result, Err(RoofError::DimensionMismatch { .. })));
    }

    #[test]
    fn degenerate_layouts_are_rejected() {
        let session = session_for(GrayImage::new(10, 10));
        let bad_unit = PanelLayout::default().with_unit(0, 5);
        assert!(matches!(
            pack(session.clone(), &bad_unit, &PackerOptions::default()),
            Err(RoofError::InvalidLayout(_))
        ));

        let bad_angle = PanelLayout::default().with_angle(f64::NAN);
        assert!(pack(session.clone(), &bad_angle, &PackerOptions::default()).is_err());

        let bad_stride = PackerOptions { separator_stride: 0, ..PackerOptions::default() };
        assert!(pack(session, &PanelLayout::default(), &bad_stride).is_err());
    }

    #[test]
    fn candidate_patch_is_clipped_at_the_buffer_edge() {
        let layout = reference_layout(0.0);
        let fp = candidate_footprint(190, 195, 4, &layout, (200, 200));
        assert_eq!(fp.bounding_box(), (190, 195, 200, 200));
    }

    #[test]
    fn scan_names_parse() {
        assert_eq!(OccupancyScan::from_name("bbox"), Some(OccupancyScan::BoundingBox));
        assert_eq!(OccupancyScan::from_name("Exhaustive"), Some(OccupancyScan::Exhaustive));
        assert_eq!(OccupancyScan::from_name("nope"), None);
        assert_eq!(OccupancyScan::Exhaustive.name(), "exhaustive");
    }
}
