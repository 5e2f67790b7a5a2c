use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading result tables and rendering charts.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("result file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // `line` is 1-based and counts the header row.
    #[error("invalid result table {}{}: {reason}", path.display(), fmt_line(*line))]
    Schema {
        path: PathBuf,
        line: Option<u64>,
        reason: String,
    },

    #[error(
        "duplicate entry for algorithm \"{algorithm}\" at k={k} in {}",
        path.display()
    )]
    ReshapeCollision {
        path: PathBuf,
        algorithm: String,
        k: u64,
    },

    #[error("failed to render {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    #[error("invalid report configuration: {0}")]
    Config(String),
}

impl ReportError {
    pub(crate) fn schema(
        path: impl Into<PathBuf>,
        line: Option<u64>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Schema {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Render {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<::config::ConfigError> for ReportError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

fn fmt_line(line: Option<u64>) -> String {
    line.map(|line| format!(" (line {line})")).unwrap_or_default()
}

/// Result type for report operations.
pub type Result<T, E = ReportError> = std::result::Result<T, E>;
