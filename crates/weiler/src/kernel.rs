//! Tolerance-based geometric predicates.
//!
//! Everything the clipper decides goes through these functions. No two
//! points are ever compared bit-exactly: equality, collinearity and
//! "inside the segment" all allow a slack of `eps`.

use crate::geometry::{Point, Polygon};

/// Default tolerance for point and collinearity comparisons.
pub const EPS: f64 = 1e-8;

// ============================================================================
// POINT / SEGMENT PREDICATES
// ============================================================================

/// Two points are equal if they are no further than `eps` apart.
#[inline]
pub fn point_eq(a: Point, b: Point, eps: f64) -> bool {
    a.distance(b) <= eps
}

/// Cross product of (b - a) and (c - a).
///
/// Positive = c is left of a->b, negative = right, ~0 = collinear.
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Is `p` within the bounding box of `a`-`b`, padded by `eps`?
#[inline]
fn in_box(a: Point, b: Point, p: Point, eps: f64) -> bool {
    a.x.min(b.x) - eps <= p.x
        && p.x <= a.x.max(b.x) + eps
        && a.y.min(b.y) - eps <= p.y
        && p.y <= a.y.max(b.y) + eps
}

/// Is `p` on the closed segment `a`-`b`?
///
/// Collinear within `eps` and inside the padded bounding box.
#[inline]
pub fn on_segment(a: Point, b: Point, p: Point, eps: f64) -> bool {
    orient(a, b, p).abs() <= eps && in_box(a, b, p, eps)
}

/// Intersection point of segments `a`-`b` and `c`-`d`, if there is one.
///
/// For parallel or collinear segments only touching endpoints are reported,
/// checked in the order a, b, c, d. An overlapping sub-segment yields just
/// one of its endpoints, never the whole overlap.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point, eps: f64) -> Option<Point> {
    let denom = (a.x - b.x) * (c.y - d.y) - (a.y - b.y) * (c.x - d.x);

    if denom.abs() < eps {
        // Parallel or collinear: only endpoints lying on the other segment
        return [a, b]
            .into_iter()
            .find(|&p| on_segment(c, d, p, eps))
            .or_else(|| [c, d].into_iter().find(|&p| on_segment(a, b, p, eps)));
    }

    let ab = a.x * b.y - a.y * b.x;
    let cd = c.x * d.y - c.y * d.x;
    let p = Point::new(
        (ab * (c.x - d.x) - (a.x - b.x) * cd) / denom,
        (ab * (c.y - d.y) - (a.y - b.y) * cd) / denom,
    );

    if in_box(a, b, p, eps) && in_box(c, d, p, eps) {
        Some(p)
    } else {
        None
    }
}

/// Parametric position of `p` along the directed edge `u`->`v`.
///
/// Projection onto the edge vector, clamped to [0, 1]. Zero-length edges
/// give 0.
pub fn edge_alpha(p: Point, u: Point, v: Point, eps: f64) -> f64 {
    let dx = v.x - u.x;
    let dy = v.y - u.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < eps {
        return 0.0;
    }
    let t = ((p.x - u.x) * dx + (p.y - u.y) * dy) / len_sq;
    t.clamp(0.0, 1.0)
}

// ============================================================================
// POINT IN POLYGON (Ray Casting Algorithm)
// ============================================================================

/// Test if a point is inside a single ring using ray casting.
///
/// Casts a ray to the right and counts edge crossings. A point on the
/// boundary counts as inside.
pub fn point_in_ring(p: Point, ring: &[Point], eps: f64) -> bool {
    let n = ring.len();
    let mut inside = false;

    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];

        if on_segment(a, b, p, eps) {
            return true;
        }

        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if x_cross > p.x {
                inside = !inside;
            }
        }
    }

    inside
}

/// Inside the outer ring and not inside any hole (boundaries inclusive).
///
/// A point on a hole's boundary is therefore outside the polygon.
pub fn point_in_polygon_with_holes(p: Point, polygon: &Polygon, eps: f64) -> bool {
    if !point_in_ring(p, &polygon.outer, eps) {
        return false;
    }
    !polygon.holes.iter().any(|hole| point_in_ring(p, hole, eps))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![pt(x, y), pt(x + size, y), pt(x + size, y + size), pt(x, y + size)]
    }

    #[test]
    fn point_eq_uses_tolerance() {
        assert!(point_eq(pt(1.0, 1.0), pt(1.0 + 1e-9, 1.0), EPS));
        assert!(!point_eq(pt(1.0, 1.0), pt(1.0 + 1e-6, 1.0), EPS));
    }

    #[test]
    fn orient_sign_gives_turn() {
        assert!(orient(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 1.0)) > 0.0);
        assert!(orient(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, -1.0)) < 0.0);
        assert_eq!(orient(pt(0.0, 0.0), pt(1.0, 1.0), pt(2.0, 2.0)), 0.0);
    }

    #[test]
    fn on_segment_checks_box() {
        assert!(on_segment(pt(0.0, 0.0), pt(4.0, 0.0), pt(2.0, 0.0), EPS));
        assert!(on_segment(pt(0.0, 0.0), pt(4.0, 0.0), pt(4.0, 0.0), EPS));
        // Collinear but past the end
        assert!(!on_segment(pt(0.0, 0.0), pt(4.0, 0.0), pt(5.0, 0.0), EPS));
        assert!(!on_segment(pt(0.0, 0.0), pt(4.0, 0.0), pt(2.0, 0.1), EPS));
    }

    #[test]
    fn crossing_segments_intersect() {
        let p = segment_intersection(pt(0.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(10.0, 0.0), EPS)
            .expect("segments cross");
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        // Lines cross at (5,5) but the second segment stops short
        let p = segment_intersection(pt(0.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(4.0, 6.0), EPS);
        assert!(p.is_none());
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let p = segment_intersection(pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 5.0), pt(10.0, 5.0), EPS);
        assert!(p.is_none());
    }

    #[test]
    fn collinear_touching_reports_shared_endpoint() {
        let p = segment_intersection(pt(0.0, 0.0), pt(2.0, 0.0), pt(2.0, 0.0), pt(5.0, 0.0), EPS);
        assert_eq!(p, Some(pt(2.0, 0.0)));
    }

    #[test]
    fn collinear_overlap_reports_one_endpoint_only() {
        // Overlap is [2, 4]; endpoint `b` of the first segment is checked first
        let p = segment_intersection(pt(0.0, 0.0), pt(4.0, 0.0), pt(2.0, 0.0), pt(6.0, 0.0), EPS);
        assert_eq!(p, Some(pt(4.0, 0.0)));
    }

    #[test]
    fn t_junction_intersects_at_endpoint() {
        let p = segment_intersection(pt(0.0, 0.0), pt(4.0, 0.0), pt(2.0, 0.0), pt(2.0, 3.0), EPS)
            .expect("touches");
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn alpha_is_clamped_projection() {
        let u = pt(0.0, 0.0);
        let v = pt(4.0, 0.0);
        assert_relative_eq!(edge_alpha(pt(1.0, 0.0), u, v, EPS), 0.25);
        assert_relative_eq!(edge_alpha(pt(-1.0, 0.0), u, v, EPS), 0.0);
        assert_relative_eq!(edge_alpha(pt(9.0, 0.0), u, v, EPS), 1.0);
        assert_eq!(edge_alpha(pt(1.0, 1.0), u, u, EPS), 0.0);
    }

    #[test]
    fn ring_contains_interior_and_boundary() {
        let sq = square(0.0, 0.0, 10.0);
        assert!(point_in_ring(pt(5.0, 5.0), &sq, EPS));
        assert!(point_in_ring(pt(0.0, 5.0), &sq, EPS));
        assert!(point_in_ring(pt(10.0, 10.0), &sq, EPS));
        assert!(!point_in_ring(pt(15.0, 5.0), &sq, EPS));
        assert!(!point_in_ring(pt(-1.0, 5.0), &sq, EPS));
    }

    #[test]
    fn ring_test_on_concave_shape() {
        // U shape: notch between x=4..6 from y=4 upwards
        let u = vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 10.0),
            pt(6.0, 10.0),
            pt(6.0, 4.0),
            pt(4.0, 4.0),
            pt(4.0, 10.0),
            pt(0.0, 10.0),
        ];
        assert!(point_in_ring(pt(2.0, 8.0), &u, EPS));
        assert!(point_in_ring(pt(8.0, 8.0), &u, EPS));
        assert!(!point_in_ring(pt(5.0, 8.0), &u, EPS));
        assert!(point_in_ring(pt(5.0, 2.0), &u, EPS));
    }

    #[test]
    fn empty_ring_contains_nothing() {
        assert!(!point_in_ring(pt(0.0, 0.0), &[], EPS));
    }

    #[test]
    fn holes_are_excluded() {
        let mut hole = square(3.0, 3.0, 4.0);
        hole.reverse();
        let poly = Polygon::with_holes(square(0.0, 0.0, 10.0), vec![hole]);

        assert!(point_in_polygon_with_holes(pt(1.0, 1.0), &poly, EPS));
        assert!(!point_in_polygon_with_holes(pt(5.0, 5.0), &poly, EPS));
        // Hole boundary belongs to the hole
        assert!(!point_in_polygon_with_holes(pt(3.0, 5.0), &poly, EPS));
        assert!(!point_in_polygon_with_holes(pt(20.0, 5.0), &poly, EPS));
    }
}
