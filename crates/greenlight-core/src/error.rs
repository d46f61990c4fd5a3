//! Error types for GreenLight core.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Result type for GreenLight operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured context attached to an error for operator logs.
pub type Details = Map<String, Value>;

/// Errors that can occur while checking a pull request.
///
/// Every variant carries a stable machine-readable [`code`](Error::code) and a
/// details bag for structured logging.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input is missing or malformed.
    #[error("{message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
        /// Structured context (e.g. the offending input).
        details: Details,
    },

    /// A request to the GitHub API failed.
    #[error("{message}")]
    GitHubApi {
        /// Description of the failed request.
        message: String,
        /// HTTP status code, when the server answered.
        status: Option<u16>,
        /// Structured context (owner, repo, pull number, ...).
        details: Details,
    },

    /// Diff text is empty or malformed.
    #[error("{message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
        /// Length of the content that failed to parse.
        content_length: usize,
        /// Structured context.
        details: Details,
    },

    /// Feature detection failed for a file or signature.
    ///
    /// The detector downgrades these to empty results; the variant exists so
    /// the failure can be logged with the same structure as fatal errors.
    #[error("{message}")]
    FeatureDetection {
        /// Description of the detection failure.
        message: String,
        /// Feature the failure relates to, if any.
        feature_id: Option<String>,
        /// Structured context.
        details: Details,
    },

    /// Compatibility checking failed.
    #[error("{message}")]
    Compatibility {
        /// Description of the failure.
        message: String,
        /// Structured context.
        details: Details,
    },

    /// A cache operation failed.
    #[error("{message}")]
    Cache {
        /// Description of the failure.
        message: String,
        /// Structured context.
        details: Details,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Create a GitHub API error with an optional HTTP status.
    pub fn github_api(message: impl Into<String>, status: Option<u16>) -> Self {
        let mut details = Details::new();
        details.insert("statusCode".to_string(), json!(status));
        Self::GitHubApi {
            message: message.into(),
            status,
            details,
        }
    }

    /// Create a parse error for content of the given length.
    pub fn parse(message: impl Into<String>, content_length: usize) -> Self {
        let mut details = Details::new();
        details.insert("contentLength".to_string(), json!(content_length));
        Self::Parse {
            message: message.into(),
            content_length,
            details,
        }
    }

    /// Create a feature detection error.
    pub fn feature_detection(message: impl Into<String>, feature_id: Option<&str>) -> Self {
        let mut details = Details::new();
        details.insert("featureId".to_string(), json!(feature_id));
        Self::FeatureDetection {
            message: message.into(),
            feature_id: feature_id.map(str::to_string),
            details,
        }
    }

    /// Create a compatibility error.
    pub fn compatibility(message: impl Into<String>) -> Self {
        Self::Compatibility {
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            details: Details::new(),
        }
    }

    /// Attach a piece of structured context.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details_mut().insert(key.into(), value.into());
        self
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "CONFIGURATION_ERROR",
            Error::GitHubApi { .. } => "GITHUB_API_ERROR",
            Error::Parse { .. } => "PARSE_ERROR",
            Error::FeatureDetection { .. } => "FEATURE_DETECTION_ERROR",
            Error::Compatibility { .. } => "COMPATIBILITY_ERROR",
            Error::Cache { .. } => "CACHE_ERROR",
        }
    }

    /// Structured context attached to this error.
    pub fn details(&self) -> &Details {
        match self {
            Error::Configuration { details, .. }
            | Error::GitHubApi { details, .. }
            | Error::Parse { details, .. }
            | Error::FeatureDetection { details, .. }
            | Error::Compatibility { details, .. }
            | Error::Cache { details, .. } => details,
        }
    }

    fn details_mut(&mut self) -> &mut Details {
        match self {
            Error::Configuration { details, .. }
            | Error::GitHubApi { details, .. }
            | Error::Parse { details, .. }
            | Error::FeatureDetection { details, .. }
            | Error::Compatibility { details, .. }
            | Error::Cache { details, .. } => details,
        }
    }

    /// HTTP status code for GitHub API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::GitHubApi { status, .. } => *status,
            _ => None,
        }
    }

    /// Human-readable message for the person who triggered the check.
    pub fn user_message(&self) -> String {
        match self {
            Error::GitHubApi { status: Some(404), .. } => {
                "Could not find the pull request. Please check that the action is triggered by a pull request event.".to_string()
            }
            Error::GitHubApi { status: Some(403), .. } => {
                "GitHub API rate limit exceeded or insufficient permissions. Please check your github-token.".to_string()
            }
            Error::GitHubApi { status: Some(401), .. } => {
                "GitHub authentication failed. Please check your github-token.".to_string()
            }
            Error::GitHubApi { message, .. } => format!("GitHub API error: {message}"),
            Error::Configuration { message, .. } => format!("Configuration error: {message}"),
            Error::Parse { message, .. } => format!("Failed to parse code: {message}"),
            Error::FeatureDetection { message, .. } => {
                format!("Feature detection failed: {message}")
            }
            Error::Compatibility { message, .. } => {
                format!("Compatibility check failed: {message}")
            }
            Error::Cache { message, .. } => message.clone(),
        }
    }

    /// One-line hint printed next to the user message.
    pub fn hint(&self) -> &'static str {
        match self {
            Error::Configuration { .. } => "Please check your workflow configuration",
            Error::GitHubApi { .. } => "Check your token permissions and rate limits",
            Error::Parse { .. } => "Failed to parse PR diff",
            Error::FeatureDetection { .. } => "Failed to detect features",
            Error::Compatibility { .. } => "Failed to evaluate feature compatibility",
            Error::Cache { .. } => "Internal cache failure",
        }
    }

    /// Structured record for operator logs.
    pub fn log_record(&self) -> Value {
        json!({
            "code": self.code(),
            "message": self.to_string(),
            "details": self.details(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Error::configuration("x").code(), "CONFIGURATION_ERROR");
        assert_eq!(Error::github_api("x", None).code(), "GITHUB_API_ERROR");
        assert_eq!(Error::parse("x", 0).code(), "PARSE_ERROR");
        assert_eq!(
            Error::feature_detection("x", None).code(),
            "FEATURE_DETECTION_ERROR"
        );
        assert_eq!(Error::compatibility("x").code(), "COMPATIBILITY_ERROR");
        assert_eq!(Error::cache("x").code(), "CACHE_ERROR");
    }

    #[test]
    fn test_user_message_by_status() {
        assert!(Error::github_api("gone", Some(404))
            .user_message()
            .starts_with("Could not find the pull request"));
        assert!(Error::github_api("denied", Some(403))
            .user_message()
            .contains("rate limit"));
        assert!(Error::github_api("bad token", Some(401))
            .user_message()
            .contains("authentication failed"));
        assert_eq!(
            Error::github_api("boom", Some(500)).user_message(),
            "GitHub API error: boom"
        );
    }

    #[test]
    fn test_parse_error_records_content_length() {
        let err = Error::parse("Diff content is empty", 0);
        assert_eq!(err.details()["contentLength"], json!(0));
        assert!(matches!(err, Error::Parse { content_length: 0, .. }));
    }

    #[test]
    fn test_with_detail_and_log_record() {
        let err = Error::github_api("Failed to fetch PR #7 diff", Some(502))
            .with_detail("owner", "acme")
            .with_detail("pullNumber", 7);
        let record = err.log_record();
        assert_eq!(record["code"], "GITHUB_API_ERROR");
        assert_eq!(record["details"]["owner"], "acme");
        assert_eq!(record["details"]["pullNumber"], 7);
        assert_eq!(record["details"]["statusCode"], 502);
        assert_eq!(err.status(), Some(502));
    }
}
