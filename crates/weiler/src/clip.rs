//! Polygon intersection entry point.
//!
//! Sequences the stages: build the intersection graph, fall back to a
//! containment test when the boundaries never cross, otherwise classify the
//! crossings and trace the result rings.

use crate::classify::mark_entry_exit;
use crate::geometry::{Polygon, Ring};
use crate::graph::IntersectionGraph;
use crate::kernel::EPS;
use crate::trace::{containment_fallback, trace_rings};

/// Tuning for a clip call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipOptions {
    /// Tolerance for every point/collinearity comparison.
    pub epsilon: f64,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self { epsilon: EPS }
    }
}

impl ClipOptions {
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

/// Intersect `subject` with `clipper` using the default tolerance.
///
/// Both polygons must be wound conventionally (outer CCW, holes CW); see
/// [`Polygon::normalized`]. Degenerate input never panics, it just yields
/// fewer rings. An empty result means the polygons do not overlap.
///
/// # Example
/// ```
/// use weiler::{clip, Point, Polygon};
///
/// let square = |x: f64, y: f64| Polygon::new(vec![
///     Point::new(x, y),
///     Point::new(x + 4.0, y),
///     Point::new(x + 4.0, y + 4.0),
///     Point::new(x, y + 4.0),
/// ]);
///
/// let rings = clip(&square(0.0, 0.0), &square(2.0, 2.0));
/// assert_eq!(rings.len(), 1);
/// assert_eq!(rings[0].len(), 4);
/// ```
pub fn clip(subject: &Polygon, clipper: &Polygon) -> Vec<Ring> {
    clip_with(subject, clipper, &ClipOptions::default())
}

/// Intersect `subject` with `clipper` using the given options.
pub fn clip_with(subject: &Polygon, clipper: &Polygon, options: &ClipOptions) -> Vec<Ring> {
    let eps = options.epsilon;

    let mut graph = IntersectionGraph::build(subject, clipper, eps);

    if !graph.has_intersections() {
        log::debug!("boundaries never cross, falling back to containment");
        return containment_fallback(subject, clipper, eps);
    }

    mark_entry_exit(&mut graph, clipper, eps);
    trace_rings(&mut graph, eps)
}

// ============================================================================
// TESTS
// ============================================================================
