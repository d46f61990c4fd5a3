//! Error types for greenlight-github

use thiserror::Error;

/// Result type alias for GitHub client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded for URL: {0}")]
    RateLimitExceeded(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header value could not be built
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::RateLimitExceeded(_) => Some(429),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Convert into the core error, prefixing what was being attempted
    pub fn into_core(self, action: &str) -> greenlight_core::Error {
        let status = self.status();
        greenlight_core::Error::github_api(format!("{action}: {self}"), status)
    }
}

impl From<Error> for greenlight_core::Error {
    fn from(error: Error) -> Self {
        let status = error.status();
        greenlight_core::Error::github_api(error.to_string(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_carried_into_core_error() {
        let err = Error::Status {
            status: 404,
            url: "https://api.github.com/repos/acme/web/pulls/7".to_string(),
        };
        let core = err.into_core("Failed to fetch PR #7 diff");
        assert_eq!(core.status(), Some(404));
        assert!(core.to_string().starts_with("Failed to fetch PR #7 diff: HTTP request failed"));
        assert!(core.user_message().starts_with("Could not find the pull request"));
    }

    #[test]
    fn test_rate_limit_maps_to_429() {
        let core: greenlight_core::Error = Error::RateLimitExceeded("u".to_string()).into();
        assert_eq!(core.status(), Some(429));
        assert_eq!(Error::other("x").status(), None);
    }
}
