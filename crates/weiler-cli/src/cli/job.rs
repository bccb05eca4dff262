//! Clip jobs: the two operands plus settings, loaded from a file.
//!
//! A job is either an SVG drawing (operands picked by role) or a YAML/JSON
//! file listing the rings directly:
//!
//! ```yaml
//! name: offset squares
//! epsilon: 1.0e-8
//! subject: [[[0, 0], [4, 0], [4, 4], [0, 4]]]
//! clipper: [[[2, 2], [6, 2], [6, 6], [2, 6]]]
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use weiler::{extract_operands_from_svg, Point, Polygon, Ring, EPS};

use super::error::CliError;

/// On-disk shape of a YAML/JSON job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// Job name/title
    #[serde(default)]
    pub name: Option<String>,

    /// Point comparison tolerance
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Fix ring winding before clipping (outer CCW, holes CW)
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Subject rings, outer boundary first
    pub subject: Vec<Vec<[f64; 2]>>,

    /// Clipper rings, outer boundary first
    pub clipper: Vec<Vec<[f64; 2]>>,
}

fn default_epsilon() -> f64 {
    EPS
}

fn default_normalize() -> bool {
    true
}

/// A loaded job, ready to clip.
#[derive(Debug, Clone)]
pub struct ClipJob {
    pub name: String,
    pub subject: Polygon,
    pub clipper: Polygon,
    pub epsilon: f64,
    pub normalize: bool,
}

/// How to read an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Svg,
    Yaml,
    Json,
}

impl InputKind {
    /// Guess from the file extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(InputKind::Svg),
            "yaml" | "yml" => Some(InputKind::Yaml),
            "json" => Some(InputKind::Json),
            _ => None,
        }
    }

    /// Guess from the content (used for stdin).
    ///
    /// XML starts with `<`, JSON with `{`, everything else is taken as YAML.
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('<') => InputKind::Svg,
            Some('{') => InputKind::Json,
            _ => InputKind::Yaml,
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a job from `path`, or from stdin when `path` is `-`.
pub fn load_job(path: &str) -> Result<ClipJob, CliError> {
    if path == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::io("<stdin>", e))?;
        let kind = InputKind::sniff(&content);
        return parse_job(&content, kind, "stdin");
    }

    let kind = InputKind::from_path(path).ok_or_else(|| {
        CliError::usage(format!("Cannot tell input type of '{}' (expected .svg, .yaml, .yml or .json)", path))
    })?;

    let content = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;

    let fallback_name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("job");

    parse_job(&content, kind, fallback_name)
}

/// Parse job content of a known kind. `fallback_name` is used when the
/// content doesn't name itself.
pub fn parse_job(content: &str, kind: InputKind, fallback_name: &str) -> Result<ClipJob, CliError> {
    match kind {
        InputKind::Svg => {
            let operands = extract_operands_from_svg(content)?;
            Ok(ClipJob {
                name: fallback_name.to_string(),
                subject: operands.subject,
                clipper: operands.clipper,
                epsilon: EPS,
                normalize: true,
            })
        }
        InputKind::Yaml => serde_yaml::from_str::<JobFile>(content)?.into_job(fallback_name),
        InputKind::Json => serde_json::from_str::<JobFile>(content)?.into_job(fallback_name),
    }
}

impl JobFile {
    /// Validate and convert to polygons.
    pub fn into_job(self, fallback_name: &str) -> Result<ClipJob, CliError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(CliError::Job(format!("epsilon must be a positive number, got {}", self.epsilon)));
        }

        let subject = to_polygon(self.subject);
        let clipper = to_polygon(self.clipper);
        if subject.is_empty() {
            return Err(CliError::Job("subject has no rings".to_string()));
        }
        if clipper.is_empty() {
            return Err(CliError::Job("clipper has no rings".to_string()));
        }

        Ok(ClipJob {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            subject,
            clipper,
            epsilon: self.epsilon,
            normalize: self.normalize,
        })
    }
}

fn to_polygon(rings: Vec<Vec<[f64; 2]>>) -> Polygon {
    let rings: Vec<Ring> = rings
        .into_iter()
        .map(|ring| ring.into_iter().map(|[x, y]| Point::new(x, y)).collect())
        .collect();
    Polygon::from_rings(rings)
}

/// Example job printed by `weiler clip --example`.
pub const EXAMPLE_JOB: &str = r##"# Example weiler job
name: "Square with a hole vs. offset square"

# Optional settings
epsilon: 1.0e-8     # point comparison tolerance
normalize: true     # fix ring winding before clipping

# Rings are lists of [x, y]; the first ring is the outer boundary,
# any further rings are holes.
subject:
  - [[0, 0], [10, 0], [10, 10], [0, 10]]
  - [[4, 4], [4, 6], [6, 6], [6, 4]]

clipper:
  - [[5, 3], [8, 3], [8, 7], [5, 7]]
"##;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_job_with_defaults() {
        let yaml = r#"
subject: [[[0, 0], [4, 0], [4, 4], [0, 4]]]
clipper: [[[2, 2], [6, 2], [6, 6], [2, 6]]]
"#;
        let job = parse_job(yaml, InputKind::Yaml, "squares").unwrap();
        assert_eq!(job.name, "squares");
        assert_eq!(job.epsilon, EPS);
        assert!(job.normalize);
        assert_eq!(job.subject.outer.len(), 4);
        assert_eq!(job.clipper.outer[0], Point::new(2.0, 2.0));
    }

    #[test]
    fn json_job_with_hole() {
        let json = r#"{
            "name": "framed",
            "epsilon": 0.001,
            "normalize": false,
            "subject": [[[0, 0], [10, 0], [10, 10], [0, 10]], [[4, 4], [4, 6], [6, 6], [6, 4]]],
            "clipper": [[[5, 3], [8, 3], [8, 7], [5, 7]]]
        }"#;
        let job = parse_job(json, InputKind::Json, "ignored").unwrap();
        assert_eq!(job.name, "framed");
        assert_eq!(job.epsilon, 0.001);
        assert!(!job.normalize);
        assert_eq!(job.subject.holes.len(), 1);
    }

    #[test]
    fn example_job_parses() {
        let job = parse_job(EXAMPLE_JOB, InputKind::Yaml, "example").unwrap();
        assert_eq!(job.subject.holes.len(), 1);
        assert!(job.clipper.holes.is_empty());
    }

    #[test]
    fn empty_operand_is_rejected() {
        let yaml = "subject: []\nclipper: [[[0, 0], [1, 0], [1, 1]]]\n";
        let err = parse_job(yaml, InputKind::Yaml, "x").unwrap_err();
        assert!(matches!(err, CliError::Job(_)));
    }

    #[test]
    fn bad_epsilon_is_rejected() {
        let yaml = "epsilon: -1\nsubject: [[[0, 0], [1, 0], [1, 1]]]\nclipper: [[[0, 0], [1, 0], [1, 1]]]\n";
        let err = parse_job(yaml, InputKind::Yaml, "x").unwrap_err();
        assert!(matches!(err, CliError::Job(_)));
    }

    #[test]
    fn missing_field_is_a_yaml_error() {
        let err = parse_job("subject: []\n", InputKind::Yaml, "x").unwrap_err();
        assert!(matches!(err, CliError::Yaml(_)));
    }

    #[test]
    fn input_kind_detection() {
        assert_eq!(InputKind::from_path("a/b.SVG"), Some(InputKind::Svg));
        assert_eq!(InputKind::from_path("job.yml"), Some(InputKind::Yaml));
        assert_eq!(InputKind::from_path("job.json"), Some(InputKind::Json));
        assert_eq!(InputKind::from_path("job.txt"), None);
        assert_eq!(InputKind::from_path("noext"), None);

        assert_eq!(InputKind::sniff("  <svg/>"), InputKind::Svg);
        assert_eq!(InputKind::sniff("{\"subject\": []}"), InputKind::Json);
        assert_eq!(InputKind::sniff("subject: []"), InputKind::Yaml);
    }
}
