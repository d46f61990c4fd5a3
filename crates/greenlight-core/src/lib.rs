//! GreenLight Core - Baseline compatibility analysis for pull request diffs.
//!
//! This crate holds the analysis pipeline and the types shared by the other
//! GreenLight crates:
//!
//! - [`diff`]: unified diff parsing and added-line extraction
//! - [`FeatureDetector`]: signature matching over added CSS/JS content
//! - [`FeatureRegistry`]: web-features lookups, backed by a [`Cache`]
//! - [`compat`]: browser-target checks, classification and scoring
//! - [`Analyzer`]: the pipeline, producing a [`CompatibilityReport`]
//! - [`PullRequestHost`]: what a check needs from the code host
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  greenlight-cli  │  (Action runner, formatters)
//! └───┬──────────┬───┘
//!     │          ▼
//!     │   ┌──────────────────┐
//!     │   │greenlight-github │  (PullRequestHost over the REST API)
//!     │   └────────┬─────────┘
//!     ▼            ▼
//! ┌──────────────────┐
//! │ greenlight-core  │  (This crate - pipeline and types)
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use greenlight_core::{Analyzer, BaselineConfig, CacheSet, DatasetLoader, FeatureRegistry};
//! use std::sync::Arc;
//!
//! # async fn run(diff: &str) -> greenlight_core::Result<()> {
//! let caches = CacheSet::new();
//! let registry = FeatureRegistry::new(Arc::new(DatasetLoader::snapshot()), caches.features.clone());
//! let analyzer = Analyzer::new(registry, BaselineConfig::default());
//!
//! let report = analyzer.analyze_diff(diff).await?;
//! println!("Score: {}/100", report.score);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cache;
pub mod compat;
pub mod constants;
pub mod dataset;
pub mod detection;
pub mod diff;
pub mod error;
pub mod host;
pub mod polyfills;
pub mod registry;
pub mod report;
pub mod types;

// Re-export core types for convenience
pub use analyzer::Analyzer;
pub use cache::{Cache, CacheSet, CacheSetStats, CacheStats};
pub use compat::{
    check_targets, classify, compare_versions, compatibility_score, custom_targets_from_value,
    parse_custom_targets, Classification, TargetCheck, TargetIssue,
};
pub use dataset::{DatasetLoader, DatasetSource, FeatureDataset};
pub use detection::FeatureDetector;
pub use diff::{added_lines, parse_pr_diff, FileDiff};
pub use error::{Error, Result};
pub use host::{PullRequestHost, COMMENT_MARKER, STATUS_CONTEXT};
pub use registry::FeatureRegistry;
pub use report::ReportBuilder;
pub use types::{
    AddedLine, BaselineConfig, BaselineFeature, BaselineStatus, Browser, BrowserSupport,
    CommitState, CompatibilityReport, CompatibilityResult, CustomTargets, PullRequestRef, Severity,
    StatusCounts,
};
