//! Ring tracing over the classified intersection graph.
//!
//! A trace starts at an unvisited subject crossing, walks forward along the
//! current polygon's ring and hops to the other polygon at every crossing,
//! until it comes back to where it started.
//!
//! Termination does not rely on an iteration cap: every hop consumes one
//! crossing that was not yet visited (a hop onto a visited crossing that
//! does not close the ring kills the trace), and every walk between hops is
//! shorter than one full ring.

use crate::geometry::{Point, Polygon, Ring};
use crate::graph::{IntersectionGraph, NodeRef, Side};
use crate::kernel::{point_eq, point_in_polygon_with_holes};

/// Where a trace currently is.
///
/// ## Rust Lesson #3: Enums as State Machines
///
/// Each variant is one state. A step consumes the old state and returns the
/// next one, and `match` forces us to say what happens in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraceState {
    /// Walking one polygon's ring, standing on crossing `at`.
    Walking { side: Side, at: NodeRef },
    /// Back at the start: the ring is complete.
    Closed,
    /// The graph led somewhere it shouldn't; drop the partial ring.
    Dead,
}

/// Trace every output ring from the classified graph.
pub fn trace_rings(graph: &mut IntersectionGraph, eps: f64) -> Vec<Ring> {
    let seeds: Vec<NodeRef> = graph.subject.intersections().collect();
    let mut results = Vec::new();

    for seed in seeds {
        let node = *graph.subject.node(seed);
        if node.visited {
            continue;
        }

        // Isolated touch or unclassifiable crossing: never a trace seed
        let (Some(link), Some(entering)) = (node.cross_link, node.direction.is_entry()) else {
            graph.subject.node_mut(seed).visited = true;
            continue;
        };

        match trace_from(graph, seed, link, entering, eps) {
            Some(ring) => results.push(ring),
            None => log::trace!("trace from {:?} discarded", node.point),
        }
    }

    log::debug!("traced {} result rings", results.len());
    results
}

/// Trace one ring starting at subject crossing `seed`.
fn trace_from(
    graph: &mut IntersectionGraph,
    seed: NodeRef,
    link: NodeRef,
    entering: bool,
    eps: f64,
) -> Option<Ring> {
    graph.subject.node_mut(seed).visited = true;
    graph.clipper.node_mut(link).visited = true;

    let mut points = vec![graph.subject.node(seed).point];

    // An exit seed means the overlap continues along the clipper
    let mut state = if entering {
        TraceState::Walking { side: Side::Subject, at: seed }
    } else {
        TraceState::Walking { side: Side::Clipper, at: link }
    };

    loop {
        state = match state {
            TraceState::Walking { side, at } => step(graph, side, at, seed, &mut points, eps),
            TraceState::Closed => break,
            TraceState::Dead => return None,
        };
    }

    finish(points, eps)
}

/// Walk forward from `at` to the next crossing and hop across.
fn step(
    graph: &mut IntersectionGraph,
    side: Side,
    at: NodeRef,
    seed: NodeRef,
    points: &mut Ring,
    eps: f64,
) -> TraceState {
    let n = graph.side(side).ring(at.ring).len();

    for k in 1..n {
        let here = NodeRef { ring: at.ring, index: (at.index + k) % n };
        let node = *graph.side(side).node(here);
        push_distinct(points, node.point, eps);

        if !node.is_intersection {
            continue;
        }

        let Some(link) = node.cross_link else {
            // Unlinked crossing: pass through
            graph.side_mut(side).node_mut(here).visited = true;
            continue;
        };

        let back_at_seed = match side {
            Side::Subject => here == seed,
            Side::Clipper => link == seed,
        };
        if back_at_seed || point_eq(points[0], node.point, eps) {
            return TraceState::Closed;
        }
        if node.visited {
            return TraceState::Dead;
        }

        graph.side_mut(side).node_mut(here).visited = true;
        graph.side_mut(side.other()).node_mut(link).visited = true;
        return TraceState::Walking { side: side.other(), at: link };
    }

    // Went all the way round without a hop: keep what we have
    TraceState::Closed
}

/// Append `p` unless it repeats the last point.
#[inline]
fn push_distinct(points: &mut Ring, p: Point, eps: f64) {
    if points.last().is_none_or(|&last| !point_eq(last, p, eps)) {
        points.push(p);
    }
}

/// Drop the closing duplicate and reject rings too small to have area.
fn finish(mut points: Ring, eps: f64) -> Option<Ring> {
    points.dedup_by(|a, b| point_eq(*a, *b, eps));
    while points.len() > 1 && point_eq(points[0], points[points.len() - 1], eps) {
        points.pop();
    }
    (points.len() >= 3).then_some(points)
}

// ============================================================================
// NO-INTERSECTION FALLBACK
// ============================================================================

/// Result when the boundaries never cross: one polygon holds the other, or
/// they are disjoint.
///
/// Containment is decided by each outer ring's first vertex, boundary
/// inclusive.
pub fn containment_fallback(subject: &Polygon, clipper: &Polygon, eps: f64) -> Vec<Ring> {
    if let Some(&rep) = subject.outer.first() {
        if point_in_polygon_with_holes(rep, clipper, eps) {
            log::debug!("subject lies inside clipper");
            return usable_rings(subject);
        }
    }
    if let Some(&rep) = clipper.outer.first() {
        if point_in_polygon_with_holes(rep, subject, eps) {
            log::debug!("clipper lies inside subject");
            return usable_rings(clipper);
        }
    }
    Vec::new()
}

fn usable_rings(polygon: &Polygon) -> Vec<Ring> {
    polygon
        .rings()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| ring.to_vec())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::mark_entry_exit;
    use crate::kernel::EPS;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![pt(x, y), pt(x + size, y), pt(x + size, y + size), pt(x, y + size)]
    }

    fn traced(subject: &Polygon, clipper: &Polygon) -> (IntersectionGraph, Vec<Ring>) {
        let mut graph = IntersectionGraph::build(subject, clipper, EPS);
        mark_entry_exit(&mut graph, clipper, EPS);
        let rings = trace_rings(&mut graph, EPS);
        (graph, rings)
    }

    #[test]
    fn offset_squares_trace_one_ring() {
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(square(2.0, 2.0, 4.0));
        let (graph, rings) = traced(&subject, &clipper);

        assert_eq!(rings, vec![vec![pt(4.0, 2.0), pt(4.0, 4.0), pt(2.0, 4.0), pt(2.0, 2.0)]]);
        assert!(graph.subject.intersections().all(|at| graph.subject.node(at).visited));
    }

    #[test]
    fn exit_seed_starts_on_clipper() {
        // Subject starts at a corner whose first crossing is an exit
        let subject = Polygon::new(vec![pt(3.0, 3.0), pt(-1.0, 3.0), pt(-1.0, 1.0), pt(3.0, 1.0)]);
        let subject = subject.normalized();
        let clipper = Polygon::new(square(0.0, 0.0, 4.0));
        let (_, rings) = traced(&subject, &clipper);

        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.len(), 4);
        for p in [pt(0.0, 1.0), pt(3.0, 1.0), pt(3.0, 3.0), pt(0.0, 3.0)] {
            assert!(ring.iter().any(|&q| point_eq(p, q, EPS)), "missing {:?}", p);
        }
    }

    #[test]
    fn comb_gives_two_rings() {
        // U-shaped subject cut by a horizontal band: two separate prongs
        let subject = Polygon::new(vec![
            pt(0.0, 0.0),
            pt(10.0, 0.0),
            pt(10.0, 10.0),
            pt(6.0, 10.0),
            pt(6.0, 4.0),
            pt(4.0, 4.0),
            pt(4.0, 10.0),
            pt(0.0, 10.0),
        ]);
        let clipper = Polygon::new(vec![pt(-1.0, 6.0), pt(11.0, 6.0), pt(11.0, 8.0), pt(-1.0, 8.0)]);
        let (_, rings) = traced(&subject, &clipper);

        assert_eq!(rings.len(), 2);
        let mut areas: Vec<f64> = rings.iter().map(|r| crate::geometry::signed_area_of_points(r)).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 8.0).abs() < 1e-9);
        assert!((areas[1] - 8.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_edges_still_give_well_formed_rings() {
        // Triangle sharing part of the subject's right edge
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(vec![pt(4.0, 0.0), pt(4.0, 4.0), pt(2.0, 2.0)]);
        let (_, rings) = traced(&subject, &clipper);

        for ring in &rings {
            assert!(ring.len() >= 3);
            for i in 0..ring.len() {
                let j = (i + 1) % ring.len();
                assert!(!point_eq(ring[i], ring[j], EPS));
            }
        }
    }

    #[test]
    fn unlinked_seed_is_skipped() {
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(square(2.0, 2.0, 4.0));
        let mut graph = IntersectionGraph::build(&subject, &clipper, EPS);
        mark_entry_exit(&mut graph, &clipper, EPS);
        for at in graph.subject.intersections().collect::<Vec<_>>() {
            graph.subject.node_mut(at).cross_link = None;
        }

        assert!(trace_rings(&mut graph, EPS).is_empty());
        assert!(graph.subject.intersections().all(|at| graph.subject.node(at).visited));
    }

    fn classified(subject: &Polygon, clipper: &Polygon) -> IntersectionGraph {
        let mut graph = IntersectionGraph::build(subject, clipper, EPS);
        mark_entry_exit(&mut graph, clipper, EPS);
        graph
    }

    fn subject_crossing_at(graph: &IntersectionGraph, p: Point) -> NodeRef {
        graph
            .subject
            .intersections()
            .find(|&at| point_eq(graph.subject.node(at).point, p, EPS))
            .expect("crossing at point")
    }

    #[test]
    fn unlinked_crossing_mid_walk_is_passed_through() {
        // Seed is the entry at (4,2); the walk up the subject's right edge
        // reaches (2,4), which has lost its partner
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(square(2.0, 2.0, 4.0));
        let mut graph = classified(&subject, &clipper);

        let far = subject_crossing_at(&graph, pt(2.0, 4.0));
        let partner = graph.subject.node(far).cross_link.expect("linked");
        graph.subject.node_mut(far).cross_link = None;
        graph.clipper.node_mut(partner).cross_link = None;

        let rings = trace_rings(&mut graph, EPS);

        assert!(graph.subject.node(far).visited);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].iter().any(|&q| point_eq(q, pt(2.0, 4.0), EPS)));
        // No hop ever happened, so the walk went round the whole subject
        assert_eq!(
            rings[0],
            vec![pt(4.0, 2.0), pt(4.0, 4.0), pt(2.0, 4.0), pt(0.0, 4.0), pt(0.0, 0.0), pt(4.0, 0.0)]
        );
    }

    #[test]
    fn hop_onto_visited_crossing_drops_the_ring() {
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(square(2.0, 2.0, 4.0));
        let mut graph = classified(&subject, &clipper);

        let far = subject_crossing_at(&graph, pt(2.0, 4.0));
        graph.subject.node_mut(far).visited = true;

        assert!(trace_rings(&mut graph, EPS).is_empty());
        let seed = subject_crossing_at(&graph, pt(4.0, 2.0));
        assert!(graph.subject.node(seed).visited);
    }

    #[test]
    fn walk_without_hop_keeps_the_full_ring() {
        // Corner touch: a single crossing at (4,4), classified as an exit, so
        // the walk runs once round the clipper and never meets another crossing
        let subject = Polygon::new(square(0.0, 0.0, 4.0));
        let clipper = Polygon::new(square(4.0, 4.0, 4.0));
        let mut graph = classified(&subject, &clipper);
        assert_eq!(graph.clipper.intersection_count(), 1);

        let rings = trace_rings(&mut graph, EPS);

        assert_eq!(rings.len(), 1);
        let expected = square(4.0, 4.0, 4.0);
        assert_eq!(rings[0].len(), expected.len());
        for (got, want) in rings[0].iter().zip(&expected) {
            assert!(point_eq(*got, *want, EPS), "{:?} != {:?}", got, want);
        }
    }

    #[test]
    fn finish_drops_closing_point_and_small_rings() {
        let ring = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 0.0)];
        assert_eq!(finish(ring, EPS), Some(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0)]));
        assert_eq!(finish(vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1e-10, 0.0)], EPS), None);
    }

    #[test]
    fn fallback_subject_inside() {
        let subject = Polygon::new(square(1.0, 1.0, 1.0));
        let clipper = Polygon::new(square(0.0, 0.0, 5.0));
        assert_eq!(containment_fallback(&subject, &clipper, EPS), subject.to_rings());
    }

    #[test]
    fn fallback_clipper_inside() {
        let subject = Polygon::new(square(0.0, 0.0, 5.0));
        let clipper = Polygon::new(square(1.0, 1.0, 1.0));
        assert_eq!(containment_fallback(&subject, &clipper, EPS), clipper.to_rings());
    }

    #[test]
    fn fallback_disjoint_is_empty() {
        let subject = Polygon::new(square(0.0, 0.0, 1.0));
        let clipper = Polygon::new(square(5.0, 5.0, 1.0));
        assert!(containment_fallback(&subject, &clipper, EPS).is_empty());
    }

    #[test]
    fn fallback_inside_a_hole_is_empty() {
        let mut hole = square(2.0, 2.0, 6.0);
        hole.reverse();
        let subject = Polygon::with_holes(square(0.0, 0.0, 10.0), vec![hole]);
        let clipper = Polygon::new(square(4.0, 4.0, 2.0));
        assert!(containment_fallback(&subject, &clipper, EPS).is_empty());
    }
}
