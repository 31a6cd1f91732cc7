//! Point-in-polygon classification.
//!
//! This is the HOT PATH of the occupancy test: it runs once per pixel of
//! every candidate's scan region, for every candidate, for every sweep.

use crate::geometry::{Point, Polygon};

/// Where a point sits relative to a polygon.
///
/// ## Rust Lesson #8: Enums instead of magic numbers
///
/// A classic vision API answers this with +1 / 0 / -1. An enum makes the
/// three cases impossible to mix up and `match` forces you to handle all
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnEdge,
    Outside,
}

/// Test if a point is inside a polygon using ray casting.
///
/// Casts a ray to the right and counts edge crossings.
/// Odd crossings = inside, even = outside. Points exactly on an edge may
/// land either way; use [`classify_point`] when that matters.
#[inline]
pub fn point_in_polygon(px: f64, py: f64, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);

        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// True when `(px, py)` lies on the closed segment `a`-`b`.
#[inline]
fn on_segment(px: f64, py: f64, a: Point, b: Point) -> bool {
    let cross = (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x);
    if cross.abs() > 1e-9 {
        return false;
    }
    px >= a.x.min(b.x) && px <= a.x.max(b.x) && py >= a.y.min(b.y) && py <= a.y.max(b.y)
}

/// Classify a point as strictly inside, on the boundary, or outside.
///
/// Boundary points are checked first so the ray-casting answer is only
/// consulted for points that are unambiguously on one side.
pub fn classify_point(px: f64, py: f64, polygon: &[Point]) -> Containment {
    let n = polygon.len();
    if n == 0 {
        return Containment::Outside;
    }

    let mut j = n - 1;
    for i in 0..n {
        if on_segment(px, py, polygon[j], polygon[i]) {
            return Containment::OnEdge;
        }
        j = i;
    }

    if point_in_polygon(px, py, polygon) {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

impl Polygon {
    /// Classify a point against this polygon. See [`classify_point`].
    #[inline]
    pub fn classify(&self, x: f64, y: f64) -> Containment {
        classify_point(x, y, &self.outer)
    }

    /// True only for points strictly inside (boundary excluded).
    #[inline]
    pub fn contains_strictly(&self, x: f64, y: f64) -> bool {
        self.classify(x, y) == Containment::Inside
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn point_inside_square() {
        let sq = square();
        assert!(point_in_polygon(5.0, 5.0, &sq.outer));
        assert!(!point_in_polygon(15.0, 5.0, &sq.outer));
        assert!(!point_in_polygon(-1.0, 5.0, &sq.outer));
    }

    #[test]
    fn boundary_is_its_own_class() {
        let sq = square();
        assert_eq!(sq.classify(5.0, 5.0), Containment::Inside);
        assert_eq!(sq.classify(0.0, 5.0), Containment::OnEdge);
        assert_eq!(sq.classify(10.0, 10.0), Containment::OnEdge);
        assert_eq!(sq.classify(5.0, 10.0), Containment::OnEdge);
        assert_eq!(sq.classify(11.0, 5.0), Containment::Outside);
        assert!(!sq.contains_strictly(0.0, 0.0));
    }

    #[test]
    fn rotated_quad_boundary() {
        // Diamond with integer vertices
        let diamond = Polygon::new(vec![
            Point::new(5.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 5.0),
        ]);
        assert_eq!(diamond.classify(7.0, 2.0), Containment::OnEdge);
        assert_eq!(diamond.classify(5.0, 5.0), Containment::Inside);
        assert_eq!(diamond.classify(1.0, 1.0), Containment::Outside);
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let empty = Polygon::default();
        assert_eq!(empty.classify(0.0, 0.0), Containment::Outside);

        let segment = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0)]);
        assert_eq!(segment.classify(2.0, 0.0), Containment::OnEdge);
        assert_eq!(segment.classify(2.0, 1.0), Containment::Outside);
    }
}
