//! Core data types for GreenLight analysis.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Baseline availability of a web-platform feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineStatus {
    /// Interoperable across the core browser set for long enough to be safe.
    WidelyAvailable,
    /// Recently became interoperable across the core browser set.
    NewlyAvailable,
    /// Missing from at least one core browser.
    Limited,
    /// Explicitly marked as not Baseline by the dataset.
    NotBaseline,
    /// No dataset record to judge from.
    Unknown,
}

impl BaselineStatus {
    /// Returns the display name for this status
    pub fn display_name(&self) -> &'static str {
        match self {
            BaselineStatus::WidelyAvailable => "Widely Available",
            BaselineStatus::NewlyAvailable => "Newly Available",
            BaselineStatus::Limited => "Limited Availability",
            BaselineStatus::NotBaseline => "Not Baseline",
            BaselineStatus::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Browsers tracked for support data and custom targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

impl Browser {
    /// Returns all tracked browsers in a consistent order
    pub fn all() -> &'static [Browser] {
        &[Browser::Chrome, Browser::Edge, Browser::Firefox, Browser::Safari]
    }

    /// Dataset / configuration key for this browser
    pub fn key(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Edge => "edge",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
        }
    }

    /// Returns the display name for this browser
    pub fn display_name(&self) -> &'static str {
        match self {
            Browser::Chrome => "Chrome",
            Browser::Edge => "Edge",
            Browser::Firefox => "Firefox",
            Browser::Safari => "Safari",
        }
    }

    /// Parse from a key, ignoring case
    pub fn from_key(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::all().iter().find(|b| b.key() == lower).copied()
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Minimum supported version per browser. Absent browsers have unknown support.
pub type BrowserSupport = BTreeMap<Browser, String>;

/// Browser versions a project must keep working in.
pub type CustomTargets = BTreeMap<Browser, String>;

/// A web-platform feature with its Baseline status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineFeature {
    /// Stable dataset key (e.g. "container-queries")
    pub id: String,
    /// Human-readable name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: BaselineStatus,
    /// Year the feature reached its current Baseline status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_year: Option<String>,
    pub support: BrowserSupport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdn_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_url: Option<String>,
}

/// A line added by the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedLine {
    /// 1-based line number in the new file
    pub line: u32,
    /// Raw line text without the leading `+`
    pub content: String,
}

/// Severity of a compatibility finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One detected feature in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub feature: BaselineFeature,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub severity: Severity,
    pub blocking: bool,
}

/// Policy applied to every detected feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineConfig {
    /// Baseline year the project targets (informational)
    pub target_year: String,
    /// Fail the check on newly available features
    pub block_newly_available: bool,
    /// Fail the check on limited / not-baseline features
    pub block_limited_availability: bool,
    /// Explicit browser matrix; overrides Baseline status when violated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_targets: Option<CustomTargets>,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            target_year: "2023".to_string(),
            block_newly_available: false,
            block_limited_availability: false,
            custom_targets: None,
        }
    }
}

/// Number of scored features per Baseline status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub widely: usize,
    pub newly: usize,
    pub limited: usize,
    pub not_baseline: usize,
}

impl StatusCounts {
    /// Count one feature with the given status. `Unknown` is ignored.
    pub fn record(&mut self, status: BaselineStatus) {
        match status {
            BaselineStatus::WidelyAvailable => self.widely += 1,
            BaselineStatus::NewlyAvailable => self.newly += 1,
            BaselineStatus::Limited => self.limited += 1,
            BaselineStatus::NotBaseline => self.not_baseline += 1,
            BaselineStatus::Unknown => {}
        }
    }

    pub fn total(&self) -> usize {
        self.widely + self.newly + self.limited + self.not_baseline
    }
}

/// Aggregated outcome of a pull request check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub results: Vec<CompatibilityResult>,
    /// Weighted compatibility score, 0-100
    pub score: u8,
    pub blocking_count: usize,
    /// Non-blocking warnings
    pub warning_count: usize,
    /// Non-blocking informational results
    pub info_count: usize,
    /// Non-blocking errors (limited features when blocking is disabled)
    pub error_count: usize,
    pub total_features: usize,
    pub status_counts: StatusCounts,
}

impl CompatibilityReport {
    /// Whether the report should fail the check
    pub fn has_blocking(&self) -> bool {
        self.blocking_count > 0
    }

    /// Results grouped by file path, in first-seen order
    pub fn results_by_file(&self) -> Vec<(&str, Vec<&CompatibilityResult>)> {
        let mut groups: Vec<(&str, Vec<&CompatibilityResult>)> = Vec::new();
        for result in &self.results {
            match groups.iter_mut().find(|(path, _)| *path == result.file_path) {
                Some((_, items)) => items.push(result),
                None => groups.push((result.file_path.as_str(), vec![result])),
            }
        }
        groups
    }
}

/// Identity of the pull request being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Commit status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
            CommitState::Failure => "failure",
        }
    }
}
