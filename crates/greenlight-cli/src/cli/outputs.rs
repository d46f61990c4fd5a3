//! GitHub Action step outputs.

use greenlight_core::{CompatibilityReport, Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const OUTPUT_SCORE: &str = "compatibility-score";
pub const OUTPUT_FEATURES: &str = "features-detected";
pub const OUTPUT_BLOCKING: &str = "blocking-issues";

/// Where step outputs go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutputs {
    /// File named by `GITHUB_OUTPUT`; stdout when unset
    path: Option<PathBuf>,
}

/// `(name, value)` pairs for a report, in a stable order
pub fn output_values(report: &CompatibilityReport) -> [(&'static str, String); 3] {
    [
        (OUTPUT_SCORE, report.score.to_string()),
        (OUTPUT_FEATURES, report.total_features.to_string()),
        (OUTPUT_BLOCKING, report.blocking_count.to_string()),
    ]
}

impl ActionOutputs {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Outputs file from `GITHUB_OUTPUT`
    pub fn from_env() -> Self {
        let path = std::env::var_os("GITHUB_OUTPUT")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `name=value` lines for the report
    pub async fn write(&self, report: &CompatibilityReport) -> Result<()> {
        let mut lines = String::new();
        for (name, value) in output_values(report) {
            lines.push_str(&format!("{name}={value}\n"));
        }

        let Some(path) = &self.path else {
            print!("{lines}");
            return Ok(());
        };

        let write_error = |e: std::io::Error| {
            Error::configuration(format!("Failed to write action outputs to {}: {e}", path.display()))
                .with_detail("path", path.display().to_string())
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(write_error)?;
        file.write_all(lines.as_bytes()).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;
        Ok(())
    }
}
