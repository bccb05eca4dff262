//! Core geometry types for weiler.
//!
//! ## Rust Lesson #1: Structs & Derives
//!
//! `#[derive(Debug, Clone, Copy, PartialEq)]` gives us printing, cheap
//! duplication and `==` for free. `Copy` is only allowed because a `Point` is
//! two plain floats - nothing on the heap.
//!
//! Note that `PartialEq` on `Point` is exact bit comparison. The clipping
//! code never uses it; it always goes through `kernel::point_eq` with a
//! tolerance.

use crate::kernel::point_eq;

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An implicitly closed ring of points.
///
/// The edge from the last point back to the first is never stored.
pub type Ring = Vec<Point>;

/// A polygon with an outer boundary and optional holes.
///
/// By convention the outer ring is counter-clockwise and holes are
/// clockwise. See [`Polygon::normalized`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    /// Outer boundary vertices (counter-clockwise)
    pub outer: Vec<Point>,
    /// Interior holes (clockwise winding)
    pub holes: Vec<Vec<Point>>,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Vec<Point>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Create a polygon with holes.
    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { outer, holes }
    }

    /// Build a polygon from a flat ring list: `rings[0]` is the outer
    /// boundary, the rest are holes. An empty list gives an empty polygon.
    pub fn from_rings(rings: Vec<Ring>) -> Self {
        let mut rings = rings.into_iter();
        let outer = rings.next().unwrap_or_default();
        Self {
            outer,
            holes: rings.collect(),
        }
    }

    /// Flatten back into a ring list, outer first.
    pub fn to_rings(&self) -> Vec<Ring> {
        self.rings().map(|ring| ring.to_vec()).collect()
    }

    /// Iterate over all rings, outer boundary first.
    ///
    /// The position in this iterator is the ring index used by the
    /// intersection graph (0 = outer, 1.. = holes).
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    /// Number of rings including the outer boundary.
    #[inline]
    pub fn ring_count(&self) -> usize {
        1 + self.holes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Get the bounding box of the outer ring as (min_x, min_y, max_x, max_y).
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

    /// Sum of the signed areas of every ring.
    ///
    /// For a normalized polygon (CCW outer, CW holes) this is the net filled
    /// area: holes subtract themselves.
    pub fn area(&self) -> f64 {
        self.rings().map(signed_area_of_points).sum()
    }

    /// Return a copy wound the conventional way: outer ring counter-clockwise,
    /// every hole clockwise.
    ///
    /// The clipping core assumes this convention but never enforces it, so
    /// whoever builds polygons from user input should call this first.
    pub fn normalized(mut self) -> Self {
        if !is_ccw(&self.outer) {
            self.outer.reverse();
        }
        for hole in &mut self.holes {
            if is_ccw(hole) {
                hole.reverse();
            }
        }
        self
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Returns:
/// - Positive value for counter-clockwise winding
/// - Negative value for clockwise winding
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

/// Counter-clockwise test: strictly positive signed area.
#[inline]
pub fn is_ccw(points: &[Point]) -> bool {
    signed_area_of_points(points) > 0.0
}

/// Drop trailing points that repeat the first one.
///
/// Drawn rings are often "closed" by clicking the start point again; the
/// model wants that closing edge implicit.
pub fn close_ring(ring: &mut Ring, eps: f64) {
    while ring.len() > 1 && point_eq(ring[0], ring[ring.len() - 1], eps) {
        ring.pop();
    }
}

// ============================================================================
// TESTS
// ============================================================================
