use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contents of `greenlight.toml`
///
/// Every setting is optional; unset values fall back to action inputs and
/// then to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GreenlightConfig {
    /// Compatibility policy
    #[serde(default)]
    pub baseline: BaselineSettings,

    /// Where to read the web-features dataset from
    #[serde(default)]
    pub dataset: DatasetSettings,
}

/// `[baseline]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BaselineSettings {
    /// Baseline year the project targets, e.g. "2024"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_year: Option<String>,

    /// Fail the check on newly available features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_newly_available: Option<bool>,

    /// Fail the check on limited-availability features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_limited_availability: Option<bool>,

    /// Minimum browser versions, e.g. `chrome = "110"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_targets: Option<toml::Table>,
}

/// `[dataset]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatasetSettings {
    /// A web-features `data.json` on disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// A web-features `data.json` served over HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: GreenlightConfig = toml::from_str("").unwrap();
        assert_eq!(config, GreenlightConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config: GreenlightConfig = toml::from_str(
            r#"
            [baseline]
            target_year = "2024"
            block_newly_available = true

            [baseline.custom_targets]
            chrome = "110"
            firefox = 115

            [dataset]
            path = "node_modules/web-features/data.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.baseline.target_year.as_deref(), Some("2024"));
        assert_eq!(config.baseline.block_newly_available, Some(true));
        assert_eq!(config.baseline.block_limited_availability, None);
        let targets = config.baseline.custom_targets.unwrap();
        assert_eq!(targets["chrome"].as_str(), Some("110"));
        assert_eq!(targets["firefox"].as_integer(), Some(115));
        assert_eq!(
            config.dataset.path,
            Some(PathBuf::from("node_modules/web-features/data.json"))
        );
        assert_eq!(config.dataset.url, None);
    }
}
