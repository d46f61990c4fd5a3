//! Resource limits for feature detection
//!
//! Detection runs regular expressions over text taken from an untrusted pull
//! request, so both the input and the compiled patterns are bounded.

/// Maximum added content scanned per file (10MB)
///
/// Larger inputs are skipped and logged instead of scanned.
pub const MAX_CONTENT_SIZE: usize = 10_485_760; // 10MB

/// Maximum signature pattern length (500 characters)
pub const MAX_REGEX_LENGTH: usize = 500;

/// Compiled regex size limit (10MB)
pub const REGEX_SIZE_LIMIT: usize = 10_000_000; // 10MB

/// Regex DFA size limit (2MB)
pub const REGEX_DFA_SIZE_LIMIT: usize = 2_000_000; // 2MB
