//! Core geometry types for roofpack.
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! Two point types live here on purpose:
//! - `Point` holds `f64` coordinates and is what rotation works on
//! - `GridPoint` holds `i32` pixel coordinates and is what buffers are indexed by
//!
//! The `#[derive(...)]` line gives both of them `Copy`, so passing them
//! around by value costs nothing (they're two numbers on the stack).

/// A 2D point with real-valued coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A pixel coordinate. Origin is the top-left corner of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

/// A closed polygon. The last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    /// Outer boundary vertices in drawing order
    pub outer: Vec<Point>,
}

/// A candidate panel-array patch: four corners after rotation.
///
/// Corner order is top-left, top-right, bottom-right, bottom-left of the
/// unrotated rectangle. Edges 0->1 and 3->2 are the two long edges that the
/// panel separators connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub corners: [GridPoint; 4],
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl GridPoint {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert a real point to pixel coordinates, truncating toward zero.
    ///
    /// ## Rust Lesson #4: `as` casts
    ///
    /// `f64 as i32` truncates toward zero and saturates at the i32 range,
    /// so -0.7 becomes 0 and 3.9 becomes 3. That truncation is what decides
    /// whether a corner that rotated to -0.5 passes the bounds guard (it
    /// does not: it lands on 0, which is not strictly positive).
    #[inline]
    pub fn truncate(p: Point) -> Self {
        Self::new(p.x as i32, p.y as i32)
    }

    /// Back to real coordinates.
    #[inline]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl From<GridPoint> for Point {
    fn from(p: GridPoint) -> Self {
        p.to_point()
    }
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.outer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Get the bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.outer.is_empty() {
            return None;
        }

        let min_x = self.outer.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.outer.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.outer.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.outer.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Some((min_x, min_y, max_x, max_y))
    }

    /// Signed area using the shoelace formula.
    ///
    /// Positive for counter-clockwise winding in a y-up frame. In image
    /// coordinates (y down) the sign flips, which is why callers that only
    /// care about size use [`Polygon::area`].
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.outer)
    }

    /// Enclosed area, independent of winding.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Exterior coordinates as a closed ring (first vertex repeated at the end).
    pub fn exterior_coords(&self) -> Vec<Point> {
        let mut ring = self.outer.clone();
        if let (Some(&first), Some(&last)) = (self.outer.first(), self.outer.last()) {
            if first != last {
                ring.push(first);
            }
        }
        ring
    }
}

impl Footprint {
    /// Truncate four rotated corners into a pixel footprint.
    pub fn from_points(points: [Point; 4]) -> Self {
        Self {
            corners: points.map(GridPoint::truncate),
        }
    }

    /// The footprint as a polygon, for containment tests.
    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.corners.iter().map(|c| c.to_point()).collect())
    }

    /// Pixel bounding box as (min_x, min_y, max_x, max_y), inclusive.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        let min_x = self.corners.iter().map(|c| c.x).min().unwrap_or(0);
        let min_y = self.corners.iter().map(|c| c.y).min().unwrap_or(0);
        let max_x = self.corners.iter().map(|c| c.x).max().unwrap_or(0);
        let max_y = self.corners.iter().map(|c| c.y).max().unwrap_or(0);
        (min_x, min_y, max_x, max_y)
    }

    /// True when every corner coordinate is strictly positive.
    ///
    /// Only the top/left side is guarded. Corners past the right or bottom
    /// edge are left to the occupancy test and the line clipper.
    #[inline]
    pub fn is_strictly_positive(&self) -> bool {
        self.corners.iter().all(|c| c.x > 0 && c.y > 0)
    }

    /// The two long edges as (start, end) pairs: corner 0->1 and corner 3->2.
    #[inline]
    pub fn long_edges(&self) -> [(GridPoint, GridPoint); 2] {
        let [c0, c1, c2, c3] = self.corners;
        [(c0, c1), (c3, c2)]
    }
}

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

/// Rotate points about `center` by `angle_degrees`.
///
/// Standard 2D rotation matrix after translating `center` to the origin,
/// then translated back. Order and count of the points are preserved.
///
/// ## Rust Lesson #5: Iterator adaptors
///
/// `.iter().map(...).collect()` allocates exactly one output Vec. The
/// closure borrows `center`, `cos` and `sin` from the enclosing scope.
pub fn rotate_points(center: Point, points: &[Point], angle_degrees: f64) -> Vec<Point> {
    let angle = angle_degrees.to_radians();
    let (sin, cos) = angle.sin_cos();

    points
        .iter()
        .map(|p| {
            let x = p.x - center.x;
            let y = p.y - center.y;
            Point::new(
                x * cos - y * sin + center.x,
                x * sin + y * cos + center.y,
            )
        })
        .collect()
}

/// Corners of an axis-aligned rectangle anchored at its top-left corner.
///
/// Returned in the fixed order top-left, top-right, bottom-right,
/// bottom-left.
#[inline]
pub fn footprint_corners(origin_x: f64, origin_y: f64, width: f64, height: f64) -> [Point; 4] {
    [
        Point::new(origin_x, origin_y),
        Point::new(origin_x + width, origin_y),
        Point::new(origin_x + width, origin_y + height),
        Point::new(origin_x, origin_y + height),
    ]
}

/// Signed area of a point sequence using the shoelace formula.
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area / 2.0
}

// ============================================================================
// TESTS
// ============================================================================
