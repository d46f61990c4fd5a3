//! Request and response bodies for the endpoints used

use serde::{Deserialize, Serialize};

/// An issue or pull request comment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Body for creating or updating a comment
#[derive(Debug, Serialize)]
pub struct CommentRequest<'a> {
    pub body: &'a str,
}

/// Body for `POST /repos/{owner}/{repo}/statuses/{sha}`
#[derive(Debug, Serialize)]
pub struct CommitStatusRequest<'a> {
    pub state: &'a str,
    pub target_url: &'a str,
    pub description: &'a str,
    pub context: &'a str,
}
