//! `greenlight analyze`: check a local diff file.

use crate::formatters::OutputFormat;
use greenlight_core::{
    Analyzer, BaselineConfig, CacheSet, CompatibilityReport, DatasetLoader, Error,
    FeatureRegistry, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Where the diff comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffInput {
    Stdin,
    File(PathBuf),
}

impl DiffInput {
    /// `-` means stdin
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            DiffInput::Stdin
        } else {
            DiffInput::File(arg.to_path_buf())
        }
    }

    pub async fn read(&self) -> Result<String> {
        match self {
            DiffInput::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(|e| Error::configuration(format!("Failed to read diff from stdin: {e}")))?;
                Ok(text)
            }
            DiffInput::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::configuration(format!("Failed to read diff {}: {e}", path.display()))
                    .with_detail("path", path.display().to_string())
            }),
        }
    }
}

pub struct AnalyzeOptions {
    pub input: DiffInput,
    pub config: BaselineConfig,
    pub format: OutputFormat,
}

/// Analyze a diff and print the report
pub async fn run_analyze(loader: Arc<DatasetLoader>, options: &AnalyzeOptions) -> Result<CompatibilityReport> {
    let diff = options.input.read().await?;
    let report = analyze_text(loader, options.config.clone(), &diff).await?;
    options.format.formatter().print(&report);
    Ok(report)
}

/// Analyze diff text with a fresh set of caches
pub async fn analyze_text(
    loader: Arc<DatasetLoader>,
    config: BaselineConfig,
    diff: &str,
) -> Result<CompatibilityReport> {
    let caches = CacheSet::new();
    let registry = FeatureRegistry::new(loader, caches.features.clone());
    let result = Analyzer::new(registry, config).analyze_diff(diff).await;
    caches.prune_all();
    result
}
