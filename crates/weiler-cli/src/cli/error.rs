//! Error type for the CLI.

use weiler::SvgError;

/// Everything a subcommand can fail with.
///
/// `main` prints these as `Error: <message>` and exits with status 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Svg(#[from] SvgError),

    #[error("Failed to parse job YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid job: {0}")]
    Job(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("{0}")]
    Usage(String),
}

impl CliError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }
}
