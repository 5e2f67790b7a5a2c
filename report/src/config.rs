use std::path::{Path, PathBuf};

use ::config::{File, FileFormat};
use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::graph::{DEFAULT_ITERATIONS, DEFAULT_X_ALGORITHM, DEFAULT_Y_ALGORITHM};

/// Layout padding applied to the first chart of the default report.
pub const TIGHT_LAYOUT_PADDING: f64 = 1.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Time against `k`, successes as lines and timeouts as markers.
    Timeline,
    /// Head-to-head scatter of two algorithms at matching `k`.
    Comparison,
}

/// One input table and the chart drawn from it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportJob {
    pub input: PathBuf,
    pub title: String,
    pub kind: ChartKind,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Output file name. Its extension is replaced by each renderer's own.
    pub output: PathBuf,
    #[serde(default)]
    pub tight_layout: Option<f64>,
    #[serde(default = "default_x_algorithm")]
    pub x_algorithm: String,
    #[serde(default = "default_y_algorithm")]
    pub y_algorithm: String,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_x_algorithm() -> String {
    DEFAULT_X_ALGORITHM.to_owned()
}

fn default_y_algorithm() -> String {
    DEFAULT_Y_ALGORITHM.to_owned()
}

impl ReportJob {
    pub fn new(
        input: impl Into<PathBuf>,
        title: impl Into<String>,
        kind: ChartKind,
        iterations: u32,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            title: title.into(),
            kind,
            iterations,
            output: output.into(),
            tight_layout: None,
            x_algorithm: default_x_algorithm(),
            y_algorithm: default_y_algorithm(),
        }
    }

    pub fn with_tight_layout(mut self, padding: f64) -> Self {
        self.tight_layout = Some(padding);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ReportError::Config(format!(
                "job `{}`: iterations must be at least 1",
                self.input.display()
            )));
        }
        if self.output.file_stem().is_none() {
            return Err(ReportError::Config(format!(
                "job `{}`: output must name a file",
                self.input.display()
            )));
        }
        Ok(())
    }
}

/// Jobs run in order by [`crate::report::generate_reports`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportConfig {
    pub jobs: Vec<ReportJob>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            jobs: vec![
                ReportJob::new(
                    "results_worst_case.txt",
                    "Runtime of exponential test case",
                    ChartKind::Timeline,
                    1,
                    "worst_case.svg",
                )
                .with_tight_layout(TIGHT_LAYOUT_PADDING),
                ReportJob::new(
                    "results_isomorphic.txt",
                    "Runtime of random unfolded test cases",
                    ChartKind::Timeline,
                    1,
                    "iso.svg",
                ),
                ReportJob::new(
                    "results_idempotent.txt",
                    "Runtime of random idempotent test cases",
                    ChartKind::Comparison,
                    10_000,
                    "idemp.svg",
                ),
                ReportJob::new(
                    "results_unfolded.txt",
                    "Runtime of random unfolded test cases",
                    ChartKind::Comparison,
                    10_000,
                    "unfolded.svg",
                ),
            ],
        }
    }
}

impl ReportConfig {
    /// Read a TOML job manifest.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = ::config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            return Err(ReportError::Config("no jobs configured".into()));
        }
        self.jobs.iter().try_for_each(ReportJob::validate)
    }
}
