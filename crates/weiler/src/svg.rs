//! SVG input - read subject and clipper polygons out of a drawing.
//!
//! Uses usvg for complete SVG resolution (CSS, transforms, etc.)
//! then walks the tree to turn each path into a polygon with holes.
//!
//! usvg does not keep `data-*` attributes, so a second, streaming pass with
//! quick-xml collects operand roles by element id.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). These must be
//! "flattened" into line segments before clipping. We use lyon_geom
//! for accurate curve approximation with a fixed tolerance.

use std::collections::HashMap;
use std::fmt;

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::geometry::{Point, Polygon, Ring, close_ring};

/// Which side of the intersection a shape is meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Subject,
    Clipper,
}

impl Role {
    /// Parse a role name (`subject`/`main`, `clipper`/`clip`), ignoring case.
    pub fn from_name(name: &str) -> Option<Role> {
        match name.trim().to_ascii_lowercase().as_str() {
            "subject" | "main" => Some(Role::Subject),
            "clipper" | "clip" => Some(Role::Clipper),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Subject => write!(f, "subject"),
            Role::Clipper => write!(f, "clipper"),
        }
    }
}

/// Error type for SVG input.
///
/// ## Rust Lesson #4: Error Enums with thiserror
///
/// Rust uses `Result<T, E>` instead of exceptions. The error type is just an
/// enum, and `#[derive(thiserror::Error)]` writes the `Display` and
/// `std::error::Error` impls from the `#[error(...)]` strings, so callers can
/// box it, print it or match on it.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("SVG parse error: {0}")]
    ParseError(String),
    #[error("XML error: {0}")]
    XmlError(String),
    #[error("No polygons found in SVG")]
    NoPolygons,
    #[error("No {0} shape found in SVG")]
    MissingOperand(Role),
}

/// One filled path from the drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub polygon: Polygon,
    /// The element's id, if it had one
    pub id: Option<String>,
    /// Role from `data-role`, the id or an enclosing group
    pub role: Option<Role>,
}

/// The two polygons to intersect.
#[derive(Debug, Clone, PartialEq)]
pub struct Operands {
    pub subject: Polygon,
    pub clipper: Polygon,
}

/// Tolerance for curve flattening.
/// Lower = more points, smoother curves, slower.
const CURVE_TOLERANCE: f32 = 0.1;

/// Consecutive points closer than this are merged after flattening.
const DUPLICATE_TOLERANCE: f64 = 1e-6;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Extract every path in the drawing as a shape, in document order.
///
/// ## Rust Lesson #5: The ? Operator
///
/// `expression?` is sugar for:
/// ```text
/// match expression {
///     Ok(v) => v,
///     Err(e) => return Err(e.into()),
/// }
/// ```
/// Both passes below can fail, and `?` bubbles either error straight up.
pub fn extract_shapes_from_svg(svg_content: &str) -> Result<Vec<Shape>, SvgError> {
    // Parse SVG using usvg (resolves CSS, transforms, etc.)
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| SvgError::ParseError(e.to_string()))?;

    let roles = collect_roles(svg_content)?;

    let mut shapes = Vec::new();
    extract_from_group(tree.root(), None, &roles, &mut shapes);

    log::debug!("extracted {} shapes from SVG", shapes.len());

    if shapes.is_empty() {
        Err(SvgError::NoPolygons)
    } else {
        Ok(shapes)
    }
}

/// Pick the subject and clipper out of a drawing.
///
/// A shape tagged with a role wins. Otherwise the first untagged shapes are
/// used, subject first.
pub fn extract_operands_from_svg(svg_content: &str) -> Result<Operands, SvgError> {
    let shapes = extract_shapes_from_svg(svg_content)?;

    let subject_idx = pick(&shapes, Role::Subject, None).ok_or(SvgError::MissingOperand(Role::Subject))?;
    let clipper_idx =
        pick(&shapes, Role::Clipper, Some(subject_idx)).ok_or(SvgError::MissingOperand(Role::Clipper))?;

    Ok(Operands {
        subject: shapes[subject_idx].polygon.clone(),
        clipper: shapes[clipper_idx].polygon.clone(),
    })
}

/// Index of the first shape with `role`, else the first untagged one that
/// isn't `taken`.
fn pick(shapes: &[Shape], role: Role, taken: Option<usize>) -> Option<usize> {
    shapes
        .iter()
        .position(|s| s.role == Some(role))
        .or_else(|| {
            shapes
                .iter()
                .enumerate()
                .position(|(i, s)| s.role.is_none() && Some(i) != taken)
        })
}

// ============================================================================
// ROLE COLLECTION (quick-xml)
// ============================================================================

/// Map element id -> role, with roles inherited from enclosing elements.
fn collect_roles(svg_content: &str) -> Result<HashMap<String, Role>, SvgError> {
    let mut reader = Reader::from_str(svg_content);
    reader.config_mut().trim_text(true);

    let mut roles = HashMap::new();
    // Effective role of every open element
    let mut stack: Vec<Option<Role>> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let role = record_role(e, stack.last().copied().flatten(), &mut roles);
                stack.push(role);
            }
            Ok(Event::Empty(ref e)) => {
                record_role(e, stack.last().copied().flatten(), &mut roles);
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SvgError::XmlError(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(roles)
}

/// Work out one element's role and remember it under its id.
fn record_role(e: &BytesStart, inherited: Option<Role>, roles: &mut HashMap<String, Role>) -> Option<Role> {
    let mut id = None;
    let mut tagged = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
            b"data-role" => tagged = Role::from_name(&String::from_utf8_lossy(&attr.value)),
            _ => {}
        }
    }

    let role = tagged
        .or_else(|| id.as_deref().and_then(Role::from_name))
        .or(inherited);

    if let (Some(id), Some(role)) = (id, role) {
        roles.insert(id, role);
    }
    role
}

// ============================================================================
// TREE WALK (usvg)
// ============================================================================

/// Recursively extract shapes from a usvg Group.
fn extract_from_group(
    group: &usvg::Group,
    inherited: Option<Role>,
    roles: &HashMap<String, Role>,
    shapes: &mut Vec<Shape>,
) {
    for child in group.children() {
        match child {
            usvg::Node::Group(inner) => {
                let role = roles.get(inner.id()).copied().or(inherited);
                extract_from_group(inner, role, roles, shapes);
            }
            usvg::Node::Path(path) => {
                if let Some(polygon) = path_to_polygon(path) {
                    let id = path.id();
                    shapes.push(Shape {
                        polygon,
                        id: (!id.is_empty()).then(|| id.to_string()),
                        role: roles.get(id).copied().or(inherited),
                    });
                }
            }
            // Ignore text, images, etc.
            _ => {}
        }
    }
}

/// Convert a usvg path to a polygon: first subpath outer, the rest holes.
///
/// Properly flattens Bézier curves using lyon_geom. Points are in the
/// drawing's user space (the path's own transforms applied).
fn path_to_polygon(path: &usvg::Path) -> Option<Polygon> {
    let data = path
        .data()
        .clone()
        .transform(path.abs_transform())
        .unwrap_or_else(|| path.data().clone());

    let mut rings: Vec<Ring> = Vec::new();
    let mut current: Ring = Vec::new();
    let mut last_point: Option<(f32, f32)> = None;

    for cmd in data.segments() {
        match cmd {
            usvg::tiny_skia_path::PathSegment::MoveTo(p) => {
                // Start of a new subpath
                if !current.is_empty() {
                    rings.push(std::mem::take(&mut current));
                }
                current.push(Point::new(p.x as f64, p.y as f64));
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::LineTo(p) => {
                current.push(Point::new(p.x as f64, p.y as f64));
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last_point {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        current.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    current.push(Point::new(p.x as f64, p.y as f64));
                }
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last_point {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |segment| {
                        current.push(Point::new(segment.to.x as f64, segment.to.y as f64));
                    });
                } else {
                    current.push(Point::new(p.x as f64, p.y as f64));
                }
                last_point = Some((p.x, p.y));
            }
            usvg::tiny_skia_path::PathSegment::Close => {
                if !current.is_empty() {
                    rings.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        rings.push(current);
    }

    let rings: Vec<Ring> = rings.into_iter().filter_map(clean_ring).collect();
    if rings.is_empty() {
        None
    } else {
        Some(Polygon::from_rings(rings))
    }
}

/// Remove duplicate points left by flattening; reject slivers.
fn clean_ring(mut ring: Ring) -> Option<Ring> {
    ring.dedup_by(|a, b| (a.x - b.x).abs() < DUPLICATE_TOLERANCE && (a.y - b.y).abs() < DUPLICATE_TOLERANCE);
    close_ring(&mut ring, DUPLICATE_TOLERANCE);
    (ring.len() >= 3).then_some(ring)
}

// ============================================================================
// TESTS
// ============================================================================
