//! The compatibility pipeline: diff → added lines → features → report.

use crate::compat::{check_targets, classify};
use crate::detection::{join_added, FeatureDetector};
use crate::diff::{added_lines, parse_pr_diff, FileDiff};
use crate::registry::FeatureRegistry;
use crate::report::ReportBuilder;
use crate::types::{BaselineConfig, CompatibilityReport, CompatibilityResult};
use crate::Result;

/// Runs the pipeline for one configuration.
///
/// Files and features are processed sequentially; the only suspension points
/// are registry lookups.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: FeatureRegistry,
    detector: FeatureDetector,
    config: BaselineConfig,
}

impl Analyzer {
    pub fn new(registry: FeatureRegistry, config: BaselineConfig) -> Self {
        Self {
            registry,
            detector: FeatureDetector::new(),
            config,
        }
    }

    /// Use a custom detector instead of the built-in signatures
    pub fn with_detector(mut self, detector: FeatureDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &BaselineConfig {
        &self.config
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Analyze a unified diff.
    ///
    /// # Errors
    /// Returns [`crate::Error::Parse`] if the diff is empty or malformed.
    pub async fn analyze_diff(&self, diff_text: &str) -> Result<CompatibilityReport> {
        let files = parse_pr_diff(diff_text)?;
        tracing::info!(files = files.len(), "parsed pull request diff");
        Ok(self.analyze_files(&files).await)
    }

    /// Analyze already-parsed file sections
    pub async fn analyze_files(&self, files: &[FileDiff]) -> CompatibilityReport {
        let mut report = ReportBuilder::new();

        for file in files {
            let Some(path) = file.to.as_deref() else {
                continue;
            };
            if file.deleted {
                continue;
            }

            let lines = added_lines(file);
            if lines.is_empty() {
                continue;
            }

            let content = join_added(&lines);
            for feature_id in self.detector.detect(path, &content) {
                let Some(feature) = self.registry.feature_by_id(&feature_id).await else {
                    tracing::debug!(feature_id = %feature_id, "feature not in registry, skipping");
                    continue;
                };

                let targets = self
                    .config
                    .custom_targets
                    .as_ref()
                    .map(|targets| check_targets(&feature.support, targets));
                if let Some(check) = targets.as_ref().filter(|c| !c.is_compatible()) {
                    tracing::warn!(
                        feature = %feature.name,
                        file = path,
                        browsers = %check.messages().join(", "),
                        "feature is incompatible with custom browser targets"
                    );
                }

                let Some(classification) = classify(feature.status, targets.as_ref(), &self.config) else {
                    continue;
                };

                let status = feature.status;
                let result = CompatibilityResult {
                    line: self.detector.locate(&feature_id, &lines),
                    feature,
                    file_path: path.to_string(),
                    severity: classification.severity,
                    blocking: classification.blocking,
                };
                report.push(result, classification.scored.then_some(status));
            }
        }

        let report = report.finish();
        tracing::info!(
            score = report.score,
            features = report.total_features,
            blocking = report.blocking_count,
            "compatibility analysis complete"
        );
        report
    }
}
