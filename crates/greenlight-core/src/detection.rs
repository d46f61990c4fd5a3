//! Feature detection over added diff lines
//!
//! Detection is line-oriented pattern matching: each web-platform feature has
//! a signature regex, and a file's added content is scanned with the
//! signatures for its language. There is no parsing of CSS or JavaScript.

use regex::{Regex, RegexBuilder};

use crate::constants::{MAX_CONTENT_SIZE, MAX_REGEX_LENGTH, REGEX_DFA_SIZE_LIMIT, REGEX_SIZE_LIMIT};
use crate::error::{Error, Result};
use crate::types::AddedLine;

/// Source language a signature applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Css,
    JavaScript,
}

impl Language {
    /// Languages scanned for a file, chosen by its extension.
    ///
    /// Vue and Svelte components carry both styles and scripts.
    pub fn for_file(file_name: &str) -> &'static [Language] {
        let extension = file_name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();

        match extension.as_str() {
            "css" | "scss" | "less" => &[Language::Css],
            "js" | "ts" | "jsx" | "tsx" => &[Language::JavaScript],
            "vue" | "svelte" => &[Language::Css, Language::JavaScript],
            _ => &[],
        }
    }
}

/// A feature signature before compilation.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// web-features id reported on a match
    pub feature_id: &'static str,
    pub language: Language,
    pub pattern: &'static str,
    pub case_insensitive: bool,
    /// When set, the pattern is matched per line and lines containing this
    /// token never match.
    pub reject_line: Option<&'static str>,
}

const fn css(feature_id: &'static str, pattern: &'static str) -> Signature {
    Signature {
        feature_id,
        language: Language::Css,
        pattern,
        case_insensitive: true,
        reject_line: None,
    }
}

/// Built-in signatures, in reporting order.
///
/// Language syntax such as optional chaining or private fields is not
/// tracked: the registry covers web-platform APIs and CSS.
pub const SIGNATURES: &[Signature] = &[
    css("container-queries", r"@container|container-type|container-name"),
    css("has", r":has\("),
    css("grid", r"display:\s*grid|grid-template"),
    css("subgrid", r"subgrid"),
    // Heuristic: `&` opening a nested rule
    css("nesting", r"&\s*\{|&\s+\."),
    css("custom-properties", r"var\(--"),
    css("logical-properties", r"inline-start|inline-end|block-start|block-end"),
    Signature {
        feature_id: "top-level-await",
        language: Language::JavaScript,
        pattern: r"await\s+",
        case_insensitive: false,
        reject_line: Some("function"),
    },
];

/// A signature with its compiled regex
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub signature: Signature,
    regex: Regex,
}

impl CompiledSignature {
    /// Compile a signature with size limits
    pub fn compile(signature: Signature) -> Result<Self> {
        if signature.pattern.len() > MAX_REGEX_LENGTH {
            return Err(Error::feature_detection(
                format!(
                    "Pattern too long (max {} chars): {}",
                    MAX_REGEX_LENGTH,
                    signature.pattern.len()
                ),
                Some(signature.feature_id),
            ));
        }

        let regex = RegexBuilder::new(signature.pattern)
            .case_insensitive(signature.case_insensitive)
            .size_limit(REGEX_SIZE_LIMIT)
            .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
            .build()
            .map_err(|e| {
                Error::feature_detection(
                    format!("Invalid signature pattern: {e}"),
                    Some(signature.feature_id),
                )
            })?;

        Ok(Self { signature, regex })
    }

    pub fn feature_id(&self) -> &'static str {
        self.signature.feature_id
    }

    /// Whether the signature matches anywhere in `content`
    pub fn is_match(&self, content: &str) -> bool {
        match self.signature.reject_line {
            // Per line, so a match cannot continue across a line break
            Some(_) => content.lines().any(|line| self.is_line_match(line)),
            None => self.regex.is_match(content),
        }
    }

    /// Whether the signature matches a single line
    pub fn is_line_match(&self, line: &str) -> bool {
        if let Some(token) = self.signature.reject_line {
            if line.contains(token) {
                return false;
            }
        }
        self.regex.is_match(line)
    }
}

/// Detects web-platform features in added content.
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    signatures: Vec<CompiledSignature>,
}

impl FeatureDetector {
    /// Detector over the built-in [`SIGNATURES`]
    pub fn new() -> Self {
        Self::with_signatures(SIGNATURES.iter().copied())
    }

    /// Detector over a custom signature set.
    ///
    /// Signatures that fail to compile are logged and left out.
    pub fn with_signatures(signatures: impl IntoIterator<Item = Signature>) -> Self {
        let signatures = signatures
            .into_iter()
            .filter_map(|signature| match CompiledSignature::compile(signature) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::error!(error = %e, details = %e.log_record(), "skipping feature signature");
                    None
                }
            })
            .collect();

        Self { signatures }
    }

    pub fn signatures(&self) -> &[CompiledSignature] {
        &self.signatures
    }

    /// Feature ids found in a file's added content, in signature order
    /// without duplicates.
    ///
    /// Never fails: unsupported files and oversized content yield nothing.
    pub fn detect(&self, file_name: &str, content: &str) -> Vec<String> {
        if file_name.is_empty() || content.is_empty() {
            return Vec::new();
        }

        if content.len() > MAX_CONTENT_SIZE {
            let error = Error::feature_detection(
                format!(
                    "Added content too large to scan (max {} bytes): {}",
                    MAX_CONTENT_SIZE,
                    content.len()
                ),
                None,
            )
            .with_detail("fileName", file_name);
            tracing::error!(details = %error.log_record(), "{error}");
            return Vec::new();
        }

        let mut features: Vec<String> = Vec::new();
        for language in Language::for_file(file_name) {
            for compiled in self.signatures.iter().filter(|s| s.signature.language == *language) {
                let id = compiled.feature_id();
                if !features.iter().any(|f| f == id) && compiled.is_match(content) {
                    features.push(id.to_string());
                }
            }
        }

        if !features.is_empty() {
            tracing::debug!(file = file_name, ?features, "detected features");
        }
        features
    }

    /// Line number of the first added line matching a feature's signature.
    ///
    /// Falls back to the first added line when no single line matches, which
    /// happens for patterns spanning lines.
    pub fn locate(&self, feature_id: &str, lines: &[AddedLine]) -> Option<u32> {
        let matched = self
            .signatures
            .iter()
            .filter(|s| s.feature_id() == feature_id)
            .find_map(|s| lines.iter().find(|l| s.is_line_match(&l.content)));

        matched.or_else(|| lines.first()).map(|l| l.line)
    }
}

impl Default for FeatureDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Join added lines into the content scanned by [`FeatureDetector::detect`]
pub fn join_added(lines: &[AddedLine]) -> String {
    lines
        .iter()
        .map(|l| l.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
