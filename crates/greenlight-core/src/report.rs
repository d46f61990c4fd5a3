//! Aggregation of per-file results into a [`CompatibilityReport`].

use crate::compat::compatibility_score;
use crate::types::{BaselineStatus, CompatibilityReport, CompatibilityResult, Severity, StatusCounts};

/// Collects results in order and derives counts and the score.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    results: Vec<CompatibilityResult>,
    status_counts: StatusCounts,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result.
    ///
    /// `counted_status` is the Baseline status to score the feature under, or
    /// `None` when a custom-target check decided the result.
    pub fn push(&mut self, result: CompatibilityResult, counted_status: Option<BaselineStatus>) {
        if let Some(status) = counted_status {
            self.status_counts.record(status);
        }
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finish(self) -> CompatibilityReport {
        let mut blocking_count = 0;
        let mut warning_count = 0;
        let mut info_count = 0;
        let mut error_count = 0;

        for result in &self.results {
            if result.blocking {
                blocking_count += 1;
                continue;
            }
            match result.severity {
                Severity::Warning => warning_count += 1,
                Severity::Info => info_count += 1,
                Severity::Error => error_count += 1,
            }
        }

        let counts = self.status_counts;
        let score = compatibility_score(counts.widely, counts.newly, counts.limited, counts.not_baseline);

        CompatibilityReport {
            total_features: self.results.len(),
            results: self.results,
            score,
            blocking_count,
            warning_count,
            info_count,
            error_count,
            status_counts: counts,
        }
    }
}
