use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Directories result tables are read from and charts are written to.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self::new(".", ".")
    }
}

impl ReportPaths {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get a path in the input directory.
    pub fn input_file(&self, name: &Path) -> PathBuf {
        self.input_dir.join(name)
    }

    /// Get a path in the output directory, with the extension replaced by `extension`.
    pub fn output_file(&self, name: &Path, extension: &str) -> PathBuf {
        self.output_dir.join(name).with_extension(extension)
    }

    /// Create the output directory if it doesn't exist.
    pub fn create_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })
    }
}
