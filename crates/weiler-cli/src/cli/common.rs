//! Common utilities shared across CLI commands.

use std::str::FromStr;

use serde::Serialize;
use weiler::{signed_area_of_points, Point, Polygon, Ring};

use super::error::CliError;

/// Output format for clip results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "svg" => Some(OutputFormat::Svg),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// The argument after flag `args[i]`, or a usage error if it's missing.
pub fn flag_value<'a>(args: &'a [String], i: usize) -> Result<&'a str, CliError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| CliError::usage(format!("{} needs a value", args[i])))
}

/// Parse the argument after flag `args[i]`.
pub fn parse_flag<T: FromStr>(args: &[String], i: usize) -> Result<T, CliError> {
    let raw = flag_value(args, i)?;
    raw.parse()
        .map_err(|_| CliError::usage(format!("Invalid value for {}: {}", args[i], raw)))
}

/// Net signed area of a ring list (CCW counts positive).
pub fn rings_area(rings: &[Ring]) -> f64 {
    rings.iter().map(|ring| signed_area_of_points(ring)).sum()
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JsonPoint {
    pub x: f64,
    pub y: f64,
}

/// JSON form of a clip result.
#[derive(Debug, Serialize)]
pub struct ClipReport {
    pub name: String,
    pub ring_count: usize,
    pub area: f64,
    pub rings: Vec<Vec<JsonPoint>>,
}

impl ClipReport {
    pub fn new(name: &str, rings: &[Ring]) -> Self {
        Self {
            name: name.to_string(),
            ring_count: rings.len(),
            area: rings_area(rings),
            rings: rings
                .iter()
                .map(|ring| ring.iter().map(|p| JsonPoint { x: p.x, y: p.y }).collect())
                .collect(),
        }
    }
}

// ============================================================================
// SVG OUTPUT
// ============================================================================

/// Padding around the drawing, as a fraction of its larger side.
const VIEW_PADDING: f64 = 0.05;

/// Draw both operands as outlines and the result filled on top.
///
/// The result uses `fill-rule="evenodd"` so hole rings punch through.
pub fn rings_to_svg(subject: &Polygon, clipper: &Polygon, rings: &[Ring]) -> String {
    let (min_x, min_y, max_x, max_y) = combined_bounds([subject, clipper]).unwrap_or((0.0, 0.0, 100.0, 100.0));
    let pad = (max_x - min_x).max(max_y - min_y).max(1.0) * VIEW_PADDING;
    let (x, y) = (min_x - pad, min_y - pad);
    let (w, h) = (max_x - min_x + pad * 2.0, max_y - min_y + pad * 2.0);
    let stroke = (w.max(h) / 400.0).max(0.01);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.2}" height="{:.2}" viewBox="{:.2} {:.2} {:.2} {:.2}">
"#,
        w, h, x, y, w, h
    ));

    svg.push_str(&format!(
        r##"<g id="result" fill="#2ca02c" fill-opacity="0.6" fill-rule="evenodd" stroke="none">
  <path d="{}"/>
</g>
"##,
        rings_path_data(rings.iter().map(|ring| ring.as_slice()))
    ));

    for (id, polygon, color) in [("subject", subject, "#1f77b4"), ("clipper", clipper, "#d62728")] {
        svg.push_str(&format!(
            r#"<g id="{}" fill="none" stroke="{}" stroke-width="{:.3}">
  <path d="{}"/>
</g>
"#,
            id,
            color,
            stroke,
            rings_path_data(polygon.rings())
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Path data with one closed subpath per ring: "M x,y L x,y ... Z".
pub fn rings_path_data<'a>(rings: impl IntoIterator<Item = &'a [Point]>) -> String {
    let mut d = String::new();
    for ring in rings {
        if ring.len() < 2 {
            continue;
        }
        for (i, pt) in ring.iter().enumerate() {
            if !d.is_empty() {
                d.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            d.push_str(&format!("{}{:.4},{:.4}", cmd, pt.x, pt.y));
        }
        d.push_str(" Z");
    }
    d
}

/// Bounding box over several polygons' outer rings.
pub fn combined_bounds<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> Option<(f64, f64, f64, f64)> {
    polygons
        .into_iter()
        .filter_map(Polygon::bounding_box)
        .reduce(|(ax0, ay0, ax1, ay1), (bx0, by0, bx1, by1)| {
            (ax0.min(bx0), ay0.min(by0), ax1.max(bx1), ay1.max(by1))
        })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn path_data_closes_each_ring() {
        let rings = [square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)];
        let d = rings_path_data(rings.iter().map(|r| r.as_slice()));
        assert!(d.starts_with("M0.0000,0.0000 L1.0000,0.0000"));
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }

    #[test]
    fn bounds_cover_both_polygons() {
        let a = Polygon::new(square(0.0, 0.0, 4.0));
        let b = Polygon::new(square(2.0, -1.0, 4.0));
        assert_eq!(combined_bounds([&a, &b]), Some((0.0, -1.0, 6.0, 4.0)));
        assert_eq!(combined_bounds([&Polygon::default()]), None);
    }

    #[test]
    fn svg_has_three_layers() {
        let a = Polygon::new(square(0.0, 0.0, 4.0));
        let b = Polygon::new(square(2.0, 2.0, 4.0));
        let svg = rings_to_svg(&a, &b, &[square(2.0, 2.0, 2.0)]);
        assert!(svg.contains(r#"id="result""#));
        assert!(svg.contains(r#"fill-rule="evenodd""#));
        assert!(svg.contains(r#"id="subject""#));
        assert!(svg.contains(r#"id="clipper""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn report_sums_ring_areas() {
        let report = ClipReport::new("t", &[square(0.0, 0.0, 2.0), square(5.0, 5.0, 1.0)]);
        assert_eq!(report.ring_count, 2);
        assert!((report.area - 5.0).abs() < 1e-12);
        assert_eq!(report.rings[1][0].x, 5.0);
    }

    #[test]
    fn flag_parsing() {
        let args: Vec<String> = ["--eps", "0.5", "--scale"].iter().map(|s| s.to_string()).collect();
        assert_eq!(parse_flag::<f64>(&args, 0).unwrap(), 0.5);
        assert!(matches!(flag_value(&args, 2), Err(CliError::Usage(_))));
        assert!(matches!(parse_flag::<usize>(&args, 0), Err(CliError::Usage(_))));
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_name("SVG"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("png"), None);
    }
}
