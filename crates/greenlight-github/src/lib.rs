//! GitHub REST API host for GreenLight checks
//!
//! [`GitHubClient`] implements [`greenlight_core::PullRequestHost`]: it
//! fetches pull request diffs, keeps a single report comment up to date and
//! sets the `Baseline Compatibility` commit status.
//!
//! # Example
//!
//! ```no_run
//! use greenlight_core::{PullRequestHost, PullRequestRef};
//! use greenlight_github::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::new(std::env::var("GITHUB_TOKEN")?)?;
//!     let diff = client.fetch_diff(&PullRequestRef::new("acme", "web", 42)).await?;
//!     println!("{} bytes of diff", diff.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod github;
mod types;

pub use client::HttpClient;
pub use error::{Error, Result};
pub use github::{
    find_marked_comment, truncate_description, GitHubClient, GITHUB_API_URL, GITHUB_SERVER_URL,
    MAX_STATUS_DESCRIPTION,
};
pub use types::{CommentRequest, CommitStatusRequest, IssueComment};
