//! Intersection graph: the dual node lists Weiler-Atherton walks.
//!
//! Each polygon gets one node list per ring, holding its original vertices
//! with the discovered intersection points spliced in, in travel order.
//! Matching intersection nodes on the two sides are cross-linked.
//!
//! ## Rust Lesson #2: Arenas Instead of Pointers
//!
//! Two nodes that point at each other would be a reference cycle, which
//! Rust's ownership rules make awkward (`Rc<RefCell<..>>` everywhere).
//! Instead every node lives in a plain `Vec` and links are just indices
//! (`NodeRef`). The whole graph is owned by one `clip` call and dropped at
//! the end of it - no cycles, no reference counting.

use crate::geometry::{Point, Polygon};
use crate::kernel::{edge_alpha, point_eq, segment_intersection};

/// Which operand a node list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Subject,
    Clipper,
}

impl Side {
    #[inline]
    pub fn other(self) -> Side {
        match self {
            Side::Subject => Side::Clipper,
            Side::Clipper => Side::Subject,
        }
    }
}

/// Index of a node: ring number, then position in that ring's node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub ring: usize,
    pub index: usize,
}

/// A directed polygon edge from vertex `start` to vertex `end` of `ring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId {
    pub ring: usize,
    pub start: usize,
    pub end: usize,
}

/// Entry/exit classification of an intersection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Unset,
    /// The boundary passes into the other polygon here.
    Entry,
    /// The boundary passes out of the other polygon here.
    Exit,
}

impl Direction {
    #[inline]
    pub fn from_entry(is_entry: bool) -> Self {
        if is_entry { Direction::Entry } else { Direction::Exit }
    }

    /// `Some(true)` for entry, `Some(false)` for exit, `None` if unset.
    #[inline]
    pub fn is_entry(self) -> Option<bool> {
        match self {
            Direction::Unset => None,
            Direction::Entry => Some(true),
            Direction::Exit => Some(false),
        }
    }

    /// The classification seen from the other polygon's side.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Direction::Unset => Direction::Unset,
            Direction::Entry => Direction::Exit,
            Direction::Exit => Direction::Entry,
        }
    }
}

/// A vertex of the traversal graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub point: Point,
    pub is_intersection: bool,
    /// Position along `edge`; intersection nodes only, used for ordering.
    pub alpha: Option<f64>,
    pub edge: EdgeId,
    /// Matching node in the other side's graph.
    pub cross_link: Option<NodeRef>,
    pub direction: Direction,
    pub visited: bool,
}

impl Node {
    fn vertex(point: Point, edge: EdgeId) -> Self {
        Self {
            point,
            is_intersection: false,
            alpha: None,
            edge,
            cross_link: None,
            direction: Direction::Unset,
            visited: false,
        }
    }

    fn intersection(point: Point, alpha: f64, edge: EdgeId) -> Self {
        Self {
            point,
            is_intersection: true,
            alpha: Some(alpha),
            ..Self::vertex(point, edge)
        }
    }
}

/// Node lists of one polygon, one `Vec` per ring.
#[derive(Debug, Clone, Default)]
pub struct PolygonGraph {
    pub rings: Vec<Vec<Node>>,
}

impl PolygonGraph {
    #[inline]
    pub fn ring(&self, ring: usize) -> &[Node] {
        &self.rings[ring]
    }

    #[inline]
    pub fn node(&self, at: NodeRef) -> &Node {
        &self.rings[at.ring][at.index]
    }

    #[inline]
    pub fn node_mut(&mut self, at: NodeRef) -> &mut Node {
        &mut self.rings[at.ring][at.index]
    }

    /// All intersection nodes, in ring order.
    pub fn intersections(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.rings.iter().enumerate().flat_map(|(ring, nodes)| {
            nodes
                .iter()
                .enumerate()
                .filter(|(_, node)| node.is_intersection)
                .map(move |(index, _)| NodeRef { ring, index })
        })
    }

    pub fn intersection_count(&self) -> usize {
        self.rings
            .iter()
            .flatten()
            .filter(|node| node.is_intersection)
            .count()
    }
}

/// One discovered crossing of a subject edge with a clipper edge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IntersectionRecord {
    point: Point,
    subject_edge: EdgeId,
    subject_alpha: f64,
    clipper_edge: EdgeId,
    clipper_alpha: f64,
}

impl IntersectionRecord {
    fn edge(&self, side: Side) -> EdgeId {
        match side {
            Side::Subject => self.subject_edge,
            Side::Clipper => self.clipper_edge,
        }
    }

    fn alpha(&self, side: Side) -> f64 {
        match side {
            Side::Subject => self.subject_alpha,
            Side::Clipper => self.clipper_alpha,
        }
    }
}

/// The complete dual graph for one subject/clipper pair.
#[derive(Debug, Clone, Default)]
pub struct IntersectionGraph {
    pub subject: PolygonGraph,
    pub clipper: PolygonGraph,
}

impl IntersectionGraph {
    /// Build both node lists, splice in every intersection and cross-link
    /// the matching pairs.
    ///
    /// Every subject edge is tested against every clipper edge, so this is
    /// quadratic in the total edge count.
    pub fn build(subject: &Polygon, clipper: &Polygon, eps: f64) -> Self {
        let records = dedup_records(find_intersections(subject, clipper, eps), eps);

        let (subject_graph, subject_refs) = splice(subject, &records, Side::Subject, eps);
        let (clipper_graph, clipper_refs) = splice(clipper, &records, Side::Clipper, eps);

        let mut graph = Self {
            subject: subject_graph,
            clipper: clipper_graph,
        };

        for (s, c) in subject_refs.into_iter().zip(clipper_refs) {
            let (Some(s), Some(c)) = (s, c) else {
                continue;
            };
            graph.link(s, c);
        }

        log::debug!(
            "intersection graph: {} unique crossings, {} subject / {} clipper intersection nodes",
            records.len(),
            graph.subject.intersection_count(),
            graph.clipper.intersection_count(),
        );

        graph
    }

    #[inline]
    pub fn side(&self, side: Side) -> &PolygonGraph {
        match side {
            Side::Subject => &self.subject,
            Side::Clipper => &self.clipper,
        }
    }

    #[inline]
    pub fn side_mut(&mut self, side: Side) -> &mut PolygonGraph {
        match side {
            Side::Subject => &mut self.subject,
            Side::Clipper => &mut self.clipper,
        }
    }

    /// Did any intersection land on the subject's boundary?
    pub fn has_intersections(&self) -> bool {
        self.subject.intersection_count() > 0
    }

    /// Cross-link a subject node with a clipper node.
    ///
    /// Links are always symmetric: a node that is already paired keeps its
    /// first partner.
    fn link(&mut self, s: NodeRef, c: NodeRef) {
        let s_link = self.subject.node(s).cross_link;
        let c_link = self.clipper.node(c).cross_link;
        match (s_link, c_link) {
            (None, None) => {
                self.subject.node_mut(s).cross_link = Some(c);
                self.clipper.node_mut(c).cross_link = Some(s);
            }
            (Some(existing), _) if existing == c => {}
            _ => log::trace!("crossing at {:?} already linked, skipping", self.subject.node(s).point),
        }
    }
}

// ============================================================================
// GRAPH CONSTRUCTION
// ============================================================================

/// Edges of a ring as (start index, end index, start point, end point).
fn ring_edges(ring: &[Point]) -> impl Iterator<Item = (usize, usize, Point, Point)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| {
        let j = (i + 1) % n;
        (i, j, ring[i], ring[j])
    })
}

/// Test every subject edge against every clipper edge.
fn find_intersections(subject: &Polygon, clipper: &Polygon, eps: f64) -> Vec<IntersectionRecord> {
    let mut records = Vec::new();

    for (si, s_ring) in subject.rings().enumerate() {
        if s_ring.len() < 2 {
            continue;
        }
        for (s_start, s_end, a, b) in ring_edges(s_ring) {
            for (ci, c_ring) in clipper.rings().enumerate() {
                if c_ring.len() < 2 {
                    continue;
                }
                for (c_start, c_end, c, d) in ring_edges(c_ring) {
                    let Some(point) = segment_intersection(a, b, c, d, eps) else {
                        continue;
                    };
                    records.push(IntersectionRecord {
                        point,
                        subject_edge: EdgeId { ring: si, start: s_start, end: s_end },
                        subject_alpha: edge_alpha(point, a, b, eps),
                        clipper_edge: EdgeId { ring: ci, start: c_start, end: c_end },
                        clipper_alpha: edge_alpha(point, c, d, eps),
                    });
                }
            }
        }
    }

    records
}

/// Merge records whose points coincide.
///
/// The first-seen record survives and keeps its edges; alphas become the
/// minimum over the merged group.
fn dedup_records(records: Vec<IntersectionRecord>, eps: f64) -> Vec<IntersectionRecord> {
    let mut unique: Vec<IntersectionRecord> = Vec::with_capacity(records.len());

    for rec in records {
        match unique.iter_mut().find(|u| point_eq(u.point, rec.point, eps)) {
            Some(u) => {
                u.subject_alpha = u.subject_alpha.min(rec.subject_alpha);
                u.clipper_alpha = u.clipper_alpha.min(rec.clipper_alpha);
            }
            None => unique.push(rec),
        }
    }

    unique
}

/// An intersection accepted into a ring, waiting to be laid out.
struct Pending {
    point: Point,
    alpha: f64,
    edge: EdgeId,
    /// Records that resolved to this node.
    records: Vec<usize>,
}

/// Build one side's node lists with intersections spliced in.
///
/// Returns the graph plus, for every record, the node it ended up at (this
/// is the record -> node map the cross-linking uses instead of searching by
/// coordinate).
fn splice(
    polygon: &Polygon,
    records: &[IntersectionRecord],
    side: Side,
    eps: f64,
) -> (PolygonGraph, Vec<Option<NodeRef>>) {
    let ring_lens: Vec<usize> = polygon.rings().map(<[Point]>::len).collect();

    // Group records by host edge: by_edge[ring][start] = record indices
    let mut by_edge: Vec<Vec<Vec<usize>>> = ring_lens.iter().map(|&n| vec![Vec::new(); n]).collect();
    for (idx, rec) in records.iter().enumerate() {
        let edge = rec.edge(side);
        by_edge[edge.ring][edge.start].push(idx);
    }

    let mut refs = vec![None; records.len()];
    let mut rings = Vec::with_capacity(ring_lens.len());

    for (ring_idx, ring) in polygon.rings().enumerate() {
        let n = ring.len();

        // Decide which records become new nodes, edge by edge
        let mut pending: Vec<Vec<Pending>> = (0..n).map(|_| Vec::new()).collect();
        for start in 0..n {
            let mut group = by_edge[ring_idx][start].clone();
            group.sort_by(|&i, &j| {
                let (a, b) = (&records[i], &records[j]);
                a.alpha(side)
                    .total_cmp(&b.alpha(side))
                    .then(a.point.x.total_cmp(&b.point.x))
                    .then(a.point.y.total_cmp(&b.point.y))
            });

            for rec_idx in group {
                let rec = &records[rec_idx];
                let alpha = rec.alpha(side);
                let existing = pending
                    .iter_mut()
                    .flatten()
                    .find(|p| point_eq(p.point, rec.point, eps));
                match existing {
                    Some(p) => {
                        if alpha < p.alpha {
                            p.alpha = alpha;
                            p.edge = rec.edge(side);
                        }
                        p.records.push(rec_idx);
                    }
                    None => pending[start].push(Pending {
                        point: rec.point,
                        alpha,
                        edge: rec.edge(side),
                        records: vec![rec_idx],
                    }),
                }
            }
        }

        // Lay out: vertex, then its edge's intersections in order
        let mut nodes = Vec::with_capacity(n + pending.iter().map(Vec::len).sum::<usize>());
        for (start, point) in ring.iter().enumerate() {
            let edge = EdgeId { ring: ring_idx, start, end: (start + 1) % n };
            nodes.push(Node::vertex(*point, edge));

            for p in &pending[start] {
                let at = NodeRef { ring: ring_idx, index: nodes.len() };
                nodes.push(Node::intersection(p.point, p.alpha, p.edge));
                for &rec_idx in &p.records {
                    refs[rec_idx] = Some(at);
                }
            }
        }

        rings.push(nodes);
    }

    (PolygonGraph { rings }, refs)
}

// ============================================================================
// TESTS
// ============================================================================
