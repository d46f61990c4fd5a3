//! Pull request identity from the GitHub Actions environment.

use greenlight_core::{Error, PullRequestRef, Result};
use serde::Deserialize;
use std::path::Path;

/// The pull request and commit a check runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub pull_request: PullRequestRef,
    /// Head commit of the pull request
    pub sha: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: HeadPayload,
}

#[derive(Debug, Deserialize)]
struct HeadPayload {
    sha: String,
}

/// Split `owner/name`.
pub fn parse_repository(repository: &str) -> Result<(String, String)> {
    match repository.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(
            Error::configuration(format!("Invalid repository `{repository}`, expected owner/name"))
                .with_detail("repository", repository),
        ),
    }
}

impl ActionContext {
    pub fn new(owner: &str, repo: &str, number: u64, sha: impl Into<String>) -> Self {
        Self {
            pull_request: PullRequestRef::new(owner, repo, number),
            sha: sha.into(),
        }
    }

    /// Build from `GITHUB_REPOSITORY` and a webhook event payload
    pub fn from_event(repository: &str, event_json: &str) -> Result<Self> {
        let (owner, repo) = parse_repository(repository)?;
        let payload: EventPayload = serde_json::from_str(event_json)
            .map_err(|e| Error::configuration(format!("Invalid GitHub event payload: {e}")))?;

        let pull_request = payload
            .pull_request
            .ok_or_else(|| Error::configuration("This action only runs on pull_request events"))?;

        Ok(Self::new(&owner, &repo, pull_request.number, pull_request.head.sha))
    }

    /// Build from an event payload file
    pub async fn from_event_file(repository: &str, event_path: &Path) -> Result<Self> {
        let event_json = tokio::fs::read_to_string(event_path).await.map_err(|e| {
            Error::configuration(format!(
                "Failed to read GitHub event payload {}: {e}",
                event_path.display()
            ))
        })?;
        Self::from_event(repository, &event_json)
    }

    /// Build from `GITHUB_REPOSITORY` and `GITHUB_EVENT_PATH`
    pub async fn from_env() -> Result<Self> {
        let repository = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| Error::configuration("GITHUB_REPOSITORY is not set"))?;
        let event_path = std::env::var("GITHUB_EVENT_PATH")
            .map_err(|_| Error::configuration("GITHUB_EVENT_PATH is not set"))?;

        Self::from_event_file(&repository, Path::new(&event_path)).await
    }
}
