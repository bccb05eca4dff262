//! Entry/exit classification of intersection nodes.
//!
//! For each subject intersection we step a tiny distance along the subject
//! boundary and ask whether we landed inside the clipper. Inside means the
//! subject is entering the clipper there. The linked clipper node gets the
//! opposite label.

use crate::geometry::{Point, Polygon};
use crate::graph::{Direction, IntersectionGraph, Node, NodeRef};
use crate::kernel::{point_eq, point_in_polygon_with_holes};

/// Classify every unclassified subject intersection node.
pub fn mark_entry_exit(graph: &mut IntersectionGraph, clipper: &Polygon, eps: f64) {
    let mut skipped = 0usize;

    for ring_idx in 0..graph.subject.rings.len() {
        for index in 0..graph.subject.rings[ring_idx].len() {
            let at = NodeRef { ring: ring_idx, index };
            let node = *graph.subject.node(at);
            if !node.is_intersection || node.direction != Direction::Unset {
                continue;
            }

            let Some(probe) = probe_point(graph.subject.ring(ring_idx), index, eps) else {
                log::trace!("no distinct neighbour for crossing at {:?}, left unclassified", node.point);
                skipped += 1;
                continue;
            };

            let direction = Direction::from_entry(point_in_polygon_with_holes(probe, clipper, eps));
            graph.subject.node_mut(at).direction = direction;
            if let Some(link) = node.cross_link {
                graph.clipper.node_mut(link).direction = direction.flipped();
            }
        }
    }

    if skipped > 0 {
        log::debug!("{} degenerate crossings could not be classified", skipped);
    }
}

/// Index of the nearest node whose point differs from `nodes[i]`.
///
/// Searches forward around the ring first, then backward.
fn distinct_neighbour(nodes: &[Node], i: usize, eps: f64) -> Option<usize> {
    let n = nodes.len();
    let here = nodes[i].point;

    let forward = (1..n).map(|k| (i + k) % n);
    let backward = (1..n).map(|k| (i + n - k) % n);
    forward
        .chain(backward)
        .find(|&j| !point_eq(nodes[j].point, here, eps))
}

/// A point just past `nodes[i]` in the direction of travel.
///
/// The offset scales with the edge length so long edges are not probed at
/// a numerically meaningless distance, with a floor for very short edges.
fn probe_point(nodes: &[Node], i: usize, eps: f64) -> Option<Point> {
    let j = distinct_neighbour(nodes, i, eps)?;
    let here = nodes[i].point;
    let next = nodes[j].point;

    let dx = next.x - here.x;
    let dy = next.y - here.y;
    let len = (dx * dx + dy * dy).sqrt();

    let (ux, uy, offset) = if len < eps {
        (1.0, 0.0, eps * 100.0)
    } else {
        (dx / len, dy / len, (eps * 10.0).max(len * 1e-4))
    };

    Some(Point::new(here.x + ux * offset, here.y + uy * offset))
}

// ============================================================================
// TESTS
// ============================================================================
