//! Abstraction over the code host a check reports to.

use crate::types::{CommitState, PullRequestRef};
use crate::Result;

/// Hidden marker identifying the report comment on a pull request.
pub const COMMENT_MARKER: &str = "<!-- greenlightci-baseline-check -->";

/// Commit status context shown in the pull request checks list.
pub const STATUS_CONTEXT: &str = "Baseline Compatibility";

/// Operations a check needs from the code host.
///
/// Implemented over the GitHub REST API by `greenlight-github`; tests use
/// in-memory implementations.
#[async_trait::async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetch the unified diff of a pull request
    ///
    /// # Errors
    /// Returns [`crate::Error::GitHubApi`] if the request fails
    async fn fetch_diff(&self, pr: &PullRequestRef) -> Result<String>;

    /// Replace the body of the comment containing `marker`, or create one
    ///
    /// # Errors
    /// Returns [`crate::Error::GitHubApi`] if listing, updating or creating
    /// the comment fails
    async fn post_or_update_comment(&self, pr: &PullRequestRef, marker: &str, body: &str) -> Result<()>;

    /// Set the commit status for `sha`
    ///
    /// # Errors
    /// Returns [`crate::Error::GitHubApi`] if the request fails. Callers treat
    /// this as best-effort.
    async fn set_commit_status(
        &self,
        pr: &PullRequestRef,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<()>;
}
