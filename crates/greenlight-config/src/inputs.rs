//! Action inputs and their merge with the config file.

use greenlight_core::{
    custom_targets_from_value, parse_custom_targets, BaselineConfig, DatasetLoader, Error, Result,
};
use std::path::PathBuf;

use crate::types::GreenlightConfig;

/// Raw action inputs, as read from `INPUT_*` variables or flags.
///
/// GitHub passes unset inputs as empty strings; those count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    pub baseline_year: Option<String>,
    pub block_newly_available: Option<String>,
    pub block_limited_availability: Option<String>,
    pub custom_browser_targets: Option<String>,
}

/// Settings for one run after all sources are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub baseline: BaselineConfig,
    pub dataset_path: Option<PathBuf>,
    pub dataset_url: Option<String>,
}

impl ResolvedConfig {
    /// Dataset loader honouring the configured path and URL
    pub fn dataset_loader(&self) -> DatasetLoader {
        DatasetLoader::with_fallbacks(self.dataset_path.clone(), self.dataset_url.clone())
    }
}

/// Parse a boolean action input.
///
/// Accepts the YAML core schema spellings `true`, `True`, `TRUE`, `false`,
/// `False` and `FALSE`.
pub fn parse_bool_input(name: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(Error::configuration(format!(
            "Input does not meet YAML 1.2 \"Core Schema\" specification: {name}. \
             Support boolean input list: `true | True | TRUE | false | False | FALSE`"
        ))
        .with_detail("input", name)
        .with_detail("value", other)),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ActionInputs {
    /// Merge inputs over the config file over built-in defaults
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] for malformed booleans or custom
    /// targets.
    pub fn resolve(&self, file: &GreenlightConfig) -> Result<ResolvedConfig> {
        let defaults = BaselineConfig::default();

        let target_year = present(&self.baseline_year)
            .map(str::to_string)
            .or_else(|| file.baseline.target_year.clone())
            .unwrap_or(defaults.target_year);

        let block_newly_available = match present(&self.block_newly_available) {
            Some(value) => parse_bool_input("block-newly-available", value)?,
            None => file
                .baseline
                .block_newly_available
                .unwrap_or(defaults.block_newly_available),
        };

        let block_limited_availability = match present(&self.block_limited_availability) {
            Some(value) => parse_bool_input("block-limited-availability", value)?,
            None => file
                .baseline
                .block_limited_availability
                .unwrap_or(defaults.block_limited_availability),
        };

        let custom_targets = match present(&self.custom_browser_targets) {
            Some(value) => parse_custom_targets(value)?,
            None => match &file.baseline.custom_targets {
                Some(table) => {
                    let document = serde_json::to_value(table).map_err(|e| {
                        Error::configuration(format!("Invalid [baseline.custom_targets]: {e}"))
                    })?;
                    custom_targets_from_value(document)?
                }
                None => None,
            },
        };

        Ok(ResolvedConfig {
            baseline: BaselineConfig {
                target_year,
                block_newly_available,
                block_limited_availability,
                custom_targets,
            },
            dataset_path: file.dataset.path.clone(),
            dataset_url: file.dataset.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::{Browser, DatasetSource};

    fn file_config() -> GreenlightConfig {
        toml::from_str(
            r#"
            [baseline]
            target_year = "2022"
            block_limited_availability = true

            [baseline.custom_targets]
            Safari = 16
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_bool_input() {
        for value in ["true", "True", "TRUE"] {
            assert!(parse_bool_input("x", value).unwrap());
        }
        for value in ["false", "False", "FALSE"] {
            assert!(!parse_bool_input("x", value).unwrap());
        }

        let err = parse_bool_input("block-newly-available", "yes").unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("block-newly-available"));
    }

    #[test]
    fn test_defaults_without_inputs_or_file() {
        let resolved = ActionInputs::default()
            .resolve(&GreenlightConfig::default())
            .unwrap();
        assert_eq!(resolved.baseline, BaselineConfig::default());
        assert_eq!(resolved.dataset_loader().sources(), &[DatasetSource::Snapshot]);
    }

    #[test]
    fn test_file_values_apply() {
        let resolved = ActionInputs::default().resolve(&file_config()).unwrap();
        assert_eq!(resolved.baseline.target_year, "2022");
        assert!(!resolved.baseline.block_newly_available);
        assert!(resolved.baseline.block_limited_availability);

        let targets = resolved.baseline.custom_targets.unwrap();
        assert_eq!(targets[&Browser::Safari], "16");
    }

    #[test]
    fn test_inputs_override_file() {
        let inputs = ActionInputs {
            baseline_year: Some("2024".to_string()),
            block_newly_available: Some("TRUE".to_string()),
            block_limited_availability: Some("false".to_string()),
            custom_browser_targets: Some(r#"{"chrome": "100"}"#.to_string()),
        };
        let resolved = inputs.resolve(&file_config()).unwrap();

        assert_eq!(resolved.baseline.target_year, "2024");
        assert!(resolved.baseline.block_newly_available);
        assert!(!resolved.baseline.block_limited_availability);
        let targets = resolved.baseline.custom_targets.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[&Browser::Chrome], "100");
    }

    #[test]
    fn test_empty_inputs_count_as_absent() {
        let inputs = ActionInputs {
            baseline_year: Some(String::new()),
            block_newly_available: Some("  ".to_string()),
            block_limited_availability: None,
            custom_browser_targets: Some(String::new()),
        };
        let resolved = inputs.resolve(&file_config()).unwrap();
        assert_eq!(resolved.baseline.target_year, "2022");
        assert!(resolved.baseline.custom_targets.is_some());
    }

    #[test]
    fn test_invalid_inputs_are_configuration_errors() {
        let inputs = ActionInputs {
            custom_browser_targets: Some("{not json".to_string()),
            ..ActionInputs::default()
        };
        let err = inputs.resolve(&GreenlightConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
