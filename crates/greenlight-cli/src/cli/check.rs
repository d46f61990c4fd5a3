//! `greenlight check`: the full pull request check.

use crate::cli::outputs::ActionOutputs;
use crate::formatters::markdown::render_comment;
use greenlight_config::ActionContext;
use greenlight_core::cache::diff_key;
use greenlight_core::{
    Analyzer, BaselineConfig, CacheSet, CommitState, CompatibilityReport, DatasetLoader,
    FeatureRegistry, PullRequestHost, Result, COMMENT_MARKER,
};
use std::sync::Arc;

pub const PENDING_DESCRIPTION: &str = "Checking baseline compatibility...";

/// Everything one check run needs besides the host
pub struct CheckOptions {
    pub context: ActionContext,
    pub config: BaselineConfig,
    pub outputs: ActionOutputs,
}

/// Final commit status for a report
pub fn final_status(report: &CompatibilityReport) -> (CommitState, String) {
    if report.has_blocking() {
        (
            CommitState::Failure,
            format!("{} blocking compatibility issues found", report.blocking_count),
        )
    } else {
        (
            CommitState::Success,
            format!("All features are compatible (Score: {}/100)", report.score),
        )
    }
}

/// Run a check against `host`.
///
/// Caches are pruned whether or not the run succeeds.
pub async fn run_check<H>(
    host: &H,
    loader: Arc<DatasetLoader>,
    caches: &CacheSet,
    options: &CheckOptions,
) -> Result<CompatibilityReport>
where
    H: PullRequestHost + ?Sized,
{
    let result = execute(host, loader, caches, options).await;

    let pruned = caches.prune_all();
    tracing::debug!(pruned, "pruned expired cache entries");

    result
}

async fn execute<H>(
    host: &H,
    loader: Arc<DatasetLoader>,
    caches: &CacheSet,
    options: &CheckOptions,
) -> Result<CompatibilityReport>
where
    H: PullRequestHost + ?Sized,
{
    let pr = &options.context.pull_request;
    let sha = &options.context.sha;
    tracing::info!(pull_request = %pr, %sha, "starting Baseline compatibility check");

    set_status(host, options, CommitState::Pending, PENDING_DESCRIPTION).await;

    let key = diff_key(&pr.owner, &pr.repo, pr.number);
    if caches.diffs.has(&key) {
        tracing::info!(pull_request = %pr, "using cached diff");
    }
    let diff = caches
        .diffs
        .get_or_set(&key, || host.fetch_diff(pr), None)
        .await?;

    let registry = FeatureRegistry::new(loader, caches.features.clone());
    let analyzer = Analyzer::new(registry, options.config.clone());
    let report = analyzer.analyze_diff(&diff).await?;

    tracing::info!(
        features = report.total_features,
        score = report.score,
        blocking = report.blocking_count,
        "analysis complete"
    );

    options.outputs.write(&report).await?;

    let body = render_comment(&report);
    host.post_or_update_comment(pr, COMMENT_MARKER, &body).await?;

    let (state, description) = final_status(&report);
    set_status(host, options, state, &description).await;

    let stats = caches.stats();
    tracing::info!(
        features = stats.features.size,
        api = stats.api.size,
        diffs = stats.diffs.size,
        "cache statistics"
    );

    Ok(report)
}

/// Status updates never fail the run
async fn set_status<H>(host: &H, options: &CheckOptions, state: CommitState, description: &str)
where
    H: PullRequestHost + ?Sized,
{
    let context = &options.context;
    if let Err(e) = host
        .set_commit_status(&context.pull_request, &context.sha, state, description)
        .await
    {
        tracing::warn!(
            state = state.as_str(),
            error = %e,
            "failed to set commit status"
        );
    }
}
