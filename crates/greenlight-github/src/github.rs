//! GitHub REST API implementation of [`PullRequestHost`]

use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::types::{CommentRequest, CommitStatusRequest, IssueComment};
use greenlight_core::cache::comment_key;
use greenlight_core::{Cache, CommitState, PullRequestHost, PullRequestRef, STATUS_CONTEXT};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use std::sync::Arc;
use url::Url;

/// Public GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Public GitHub web host
pub const GITHUB_SERVER_URL: &str = "https://github.com";

/// GitHub rejects status descriptions longer than this
pub const MAX_STATUS_DESCRIPTION: usize = 140;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

/// Comments requested per page when searching for the report comment
const COMMENTS_PER_PAGE: usize = 100;

/// Client for the pull request endpoints a check uses
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: HttpClient,
    api_url: Url,
    server_url: String,
    token: String,
    /// Remembers the report comment id per pull request
    comment_ids: Option<Arc<Cache<u64>>>,
}

impl GitHubClient {
    /// Client for github.com authenticated with `token`
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_url(token, GITHUB_API_URL)
    }

    /// Client for a specific API root (e.g. a GitHub Enterprise Server)
    pub fn with_api_url(token: impl Into<String>, api_url: &str) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::other("GitHub token is empty"));
        }

        Ok(Self {
            http: HttpClient::new()?,
            api_url: Url::parse(api_url)?,
            server_url: GITHUB_SERVER_URL.to_string(),
            token,
            comment_ids: None,
        })
    }

    /// Throttle API requests to `requests_per_second`
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Result<Self> {
        self.http = HttpClient::with_rate_limit(requests_per_second)?;
        Ok(self)
    }

    /// Web host used for status links
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Cache report comment ids between calls
    pub fn with_comment_cache(mut self, cache: Arc<Cache<u64>>) -> Self {
        self.comment_ids = Some(cache);
        self
    }

    /// Build an endpoint URL from path segments
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::other(format!("API URL cannot be a base: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn headers(&self, accept: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {}", self.token)
                .parse()
                .map_err(|_| Error::InvalidHeader("Authorization"))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Link shown next to the commit status
    pub fn actions_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/{}/{}/actions",
            self.server_url.trim_end_matches('/'),
            pr.owner,
            pr.repo
        )
    }

    async fn fetch_diff_text(&self, pr: &PullRequestRef) -> Result<String> {
        let number = pr.number.to_string();
        let url = self.endpoint(&["repos", &pr.owner, &pr.repo, "pulls", &number])?;
        self.http
            .get_text_with_headers(url.as_str(), self.headers(DIFF_MEDIA_TYPE)?)
            .await
    }

    /// Find the id of the comment containing `marker`
    async fn find_comment(&self, pr: &PullRequestRef, marker: &str) -> Result<Option<u64>> {
        let number = pr.number.to_string();
        let mut page = 1;

        loop {
            let mut url = self.endpoint(&["repos", &pr.owner, &pr.repo, "issues", &number, "comments"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &COMMENTS_PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let comments: Vec<IssueComment> = self
                .http
                .get_json_with_headers(url.as_str(), self.headers(JSON_MEDIA_TYPE)?)
                .await?;

            if let Some(id) = find_marked_comment(&comments, marker) {
                return Ok(Some(id));
            }
            if comments.len() < COMMENTS_PER_PAGE {
                return Ok(None);
            }
            page += 1;
        }
    }

    async fn update_comment(&self, pr: &PullRequestRef, id: u64, body: &str) -> Result<IssueComment> {
        let id = id.to_string();
        let url = self.endpoint(&["repos", &pr.owner, &pr.repo, "issues", "comments", &id])?;
        self.http
            .send_json_with_headers(
                Method::PATCH,
                url.as_str(),
                self.headers(JSON_MEDIA_TYPE)?,
                &CommentRequest { body },
            )
            .await
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<IssueComment> {
        let number = pr.number.to_string();
        let url = self.endpoint(&["repos", &pr.owner, &pr.repo, "issues", &number, "comments"])?;
        self.http
            .send_json_with_headers(
                Method::POST,
                url.as_str(),
                self.headers(JSON_MEDIA_TYPE)?,
                &CommentRequest { body },
            )
            .await
    }

    async fn upsert_comment(&self, pr: &PullRequestRef, marker: &str, body: &str) -> Result<u64> {
        let key = comment_key(&pr.owner, &pr.repo, pr.number);

        if let Some(id) = self.comment_ids.as_ref().and_then(|cache| cache.get(&key)) {
            match self.update_comment(pr, id, body).await {
                Ok(comment) => return Ok(comment.id),
                // Deleted since it was cached
                Err(Error::Status { status: 404, .. }) => {
                    if let Some(cache) = &self.comment_ids {
                        cache.delete(&key);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let comment = match self.find_comment(pr, marker).await? {
            Some(id) => {
                tracing::debug!(comment_id = id, "updating existing report comment");
                self.update_comment(pr, id, body).await?
            }
            None => {
                tracing::debug!("creating report comment");
                self.create_comment(pr, body).await?
            }
        };

        if let Some(cache) = &self.comment_ids {
            cache.set(key, comment.id);
        }
        Ok(comment.id)
    }

    async fn create_status(
        &self,
        pr: &PullRequestRef,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<()> {
        let url = self.endpoint(&["repos", &pr.owner, &pr.repo, "statuses", sha])?;
        let target_url = self.actions_url(pr);
        let request = CommitStatusRequest {
            state: state.as_str(),
            target_url: &target_url,
            description: &truncate_description(description),
            context: STATUS_CONTEXT,
        };

        let _: serde_json::Value = self
            .http
            .send_json_with_headers(Method::POST, url.as_str(), self.headers(JSON_MEDIA_TYPE)?, &request)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PullRequestHost for GitHubClient {
    async fn fetch_diff(&self, pr: &PullRequestRef) -> greenlight_core::Result<String> {
        self.fetch_diff_text(pr).await.map_err(|e| {
            e.into_core(&format!("Failed to fetch PR #{} diff", pr.number))
                .with_detail("owner", pr.owner.as_str())
                .with_detail("repo", pr.repo.as_str())
                .with_detail("pullNumber", pr.number)
        })
    }

    async fn post_or_update_comment(
        &self,
        pr: &PullRequestRef,
        marker: &str,
        body: &str,
    ) -> greenlight_core::Result<()> {
        let id = self.upsert_comment(pr, marker, body).await.map_err(|e| {
            e.into_core(&format!("Failed to post comment on PR #{}", pr.number))
                .with_detail("owner", pr.owner.as_str())
                .with_detail("repo", pr.repo.as_str())
                .with_detail("pullNumber", pr.number)
        })?;
        tracing::info!(pull_request = %pr, comment_id = id, "report comment posted");
        Ok(())
    }

    async fn set_commit_status(
        &self,
        pr: &PullRequestRef,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> greenlight_core::Result<()> {
        self.create_status(pr, sha, state, description)
            .await
            .map_err(|e| {
                e.into_core("Failed to set commit status")
                    .with_detail("owner", pr.owner.as_str())
                    .with_detail("repo", pr.repo.as_str())
                    .with_detail("sha", sha)
            })
    }
}

/// Id of the first comment whose body contains `marker`
pub fn find_marked_comment(comments: &[IssueComment], marker: &str) -> Option<u64> {
    comments
        .iter()
        .find(|c| c.body.as_deref().is_some_and(|body| body.contains(marker)))
        .map(|c| c.id)
}

/// Shorten a status description to GitHub's limit, on a char boundary
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_STATUS_DESCRIPTION {
        return description.to_string();
    }
    let mut truncated: String = description.chars().take(MAX_STATUS_DESCRIPTION - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::COMMENT_MARKER;

    fn client() -> GitHubClient {
        GitHubClient::new("test-token").unwrap()
    }

    fn comment(id: u64, body: Option<&str>) -> IssueComment {
        IssueComment {
            id,
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(GitHubClient::new("  ").is_err());
    }

    #[test]
    fn test_rate_limit() {
        assert!(!client().http.is_rate_limited());
        assert!(client().with_rate_limit(10).unwrap().http.is_rate_limited());
        assert!(client().with_rate_limit(0).is_err());
    }

    #[test]
    fn test_endpoint() {
        let pr = PullRequestRef::new("acme", "web", 7);
        let url = client()
            .endpoint(&["repos", &pr.owner, &pr.repo, "pulls", "7"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/acme/web/pulls/7");

        let enterprise = GitHubClient::with_api_url("t", "https://ghe.example.com/api/v3/").unwrap();
        let url = enterprise.endpoint(&["repos", "acme", "web", "statuses", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/acme/web/statuses/abc");
    }

    #[test]
    fn test_headers() {
        let headers = client().headers(DIFF_MEDIA_TYPE).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer test-token");
        assert_eq!(headers[ACCEPT], DIFF_MEDIA_TYPE);
    }

    #[test]
    fn test_actions_url() {
        let pr = PullRequestRef::new("acme", "web", 7);
        assert_eq!(client().actions_url(&pr), "https://github.com/acme/web/actions");

        let ghe = client().with_server_url("https://ghe.example.com/");
        assert_eq!(ghe.actions_url(&pr), "https://ghe.example.com/acme/web/actions");
    }

    #[test]
    fn test_find_marked_comment() {
        let body = format!("{COMMENT_MARKER}\n## report");
        let comments = vec![
            comment(1, Some("LGTM")),
            comment(2, None),
            comment(3, Some(&body)),
            comment(4, Some(&body)),
        ];
        assert_eq!(find_marked_comment(&comments, COMMENT_MARKER), Some(3));
        assert_eq!(find_marked_comment(&comments[..2], COMMENT_MARKER), None);
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("All features are compatible"), "All features are compatible");

        let long = "é".repeat(200);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), MAX_STATUS_DESCRIPTION);
        assert!(truncated.ends_with('…'));
    }

    #[tokio::test]
    #[ignore] // Requires network access and a token
    async fn test_fetch_diff() {
        let token = std::env::var("GITHUB_TOKEN").unwrap();
        let client = GitHubClient::new(token).unwrap();
        let diff = client
            .fetch_diff(&PullRequestRef::new("rust-lang", "rust", 1))
            .await
            .unwrap();
        assert!(diff.contains("diff --git"));
    }
}
