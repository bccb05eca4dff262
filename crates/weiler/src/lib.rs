//! # weiler
//!
//! Intersection of two polygons with holes, using Weiler-Atherton clipping.
//!
//! The pipeline is leaf-first:
//! - `geometry` / `kernel` - points, rings, polygons and tolerant predicates
//! - `graph` - per-ring node lists with crossings spliced in and cross-linked
//! - `classify` - entry/exit label for every crossing
//! - `trace` - walk the dual graph into closed result rings
//! - `clip` - the one call most users need
//!
//! `svg` reads subject/clipper polygons out of an SVG drawing.

pub mod classify;
pub mod clip;
pub mod geometry;
pub mod graph;
pub mod kernel;
pub mod svg;
pub mod trace;

// Re-export common types at crate root for convenience.
pub use clip::{clip, clip_with, ClipOptions};
pub use geometry::{close_ring, is_ccw, signed_area_of_points, Point, Polygon, Ring};
pub use kernel::EPS;
pub use svg::{extract_operands_from_svg, extract_shapes_from_svg, Operands, Role, Shape, SvgError};
