//! Compatibility policy: browser-target checks, severity classification and
//! the compatibility score.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::{BaselineConfig, BaselineStatus, Browser, BrowserSupport, CustomTargets, Severity};

/// Compare two dotted browser versions component by component.
///
/// Each component's leading digits are read as an integer; anything else
/// counts as 0, and missing trailing components count as 0, so `"2"` equals
/// `"2.0"`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a: Vec<u64> = components(a);
    let b: Vec<u64> = components(b);
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Ranged versions such as `"≤79"` have no leading digits and read as 0.
fn components(version: &str) -> Vec<u64> {
    version.trim().split('.').map(leading_number).collect()
}

fn leading_number(component: &str) -> u64 {
    let digits: &str = {
        let trimmed = component.trim_start();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// A target browser the feature cannot run in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetIssue {
    pub browser: Browser,
    /// Minimum version supporting the feature; `None` if unsupported
    pub required: Option<String>,
    /// Version the project targets
    pub target: String,
}

impl std::fmt::Display for TargetIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.required {
            None => write!(f, "{} (not supported)", self.browser),
            Some(required) => write!(
                f,
                "{} (requires {}+, target is {})",
                self.browser, required, self.target
            ),
        }
    }
}

/// Outcome of checking a feature against custom browser targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetCheck {
    pub incompatible: Vec<TargetIssue>,
}

impl TargetCheck {
    pub fn is_compatible(&self) -> bool {
        self.incompatible.is_empty()
    }

    /// One description per incompatible browser
    pub fn messages(&self) -> Vec<String> {
        self.incompatible.iter().map(ToString::to_string).collect()
    }
}

/// Check a feature's support data against the configured targets.
///
/// A target browser is incompatible when the feature has no recorded
/// support for it, or needs a newer version than the target.
pub fn check_targets(support: &BrowserSupport, targets: &CustomTargets) -> TargetCheck {
    let incompatible = targets
        .iter()
        .filter_map(|(browser, target)| match support.get(browser) {
            None => Some(TargetIssue {
                browser: *browser,
                required: None,
                target: target.clone(),
            }),
            Some(required) if compare_versions(required, target).is_gt() => Some(TargetIssue {
                browser: *browser,
                required: Some(required.clone()),
                target: target.clone(),
            }),
            Some(_) => None,
        })
        .collect();

    TargetCheck { incompatible }
}

/// Severity and blocking decision for one detected feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub severity: Severity,
    pub blocking: bool,
    /// Whether the feature's Baseline status counts toward the score.
    /// False when a custom-target incompatibility decided the result.
    pub scored: bool,
}

/// Apply the configured policy to a feature.
///
/// Returns `None` for [`BaselineStatus::Unknown`], which produces no result.
pub fn classify(
    status: BaselineStatus,
    targets: Option<&TargetCheck>,
    config: &BaselineConfig,
) -> Option<Classification> {
    if targets.is_some_and(|check| !check.is_compatible()) {
        return Some(Classification {
            severity: Severity::Error,
            blocking: true,
            scored: false,
        });
    }

    let (severity, blocking) = match status {
        BaselineStatus::WidelyAvailable => (Severity::Info, false),
        BaselineStatus::NewlyAvailable => (Severity::Warning, config.block_newly_available),
        BaselineStatus::Limited | BaselineStatus::NotBaseline => {
            (Severity::Error, config.block_limited_availability)
        }
        BaselineStatus::Unknown => return None,
    };

    Some(Classification {
        severity,
        blocking,
        scored: true,
    })
}

/// Weighted share of safe features, 0-100, rounded half up.
///
/// Widely available features weigh 100, newly available 75, limited 25 and
/// not-baseline 0. With nothing to score the result is 100.
pub fn compatibility_score(widely: usize, newly: usize, limited: usize, not_baseline: usize) -> u8 {
    let total = (widely + newly + limited + not_baseline) as u64;
    if total == 0 {
        return 100;
    }

    let weighted = 100 * widely as u64 + 75 * newly as u64 + 25 * limited as u64;
    let score = (2 * weighted + total) / (2 * total);
    score.min(100) as u8
}

/// Parse the `custom-browser-targets` input.
///
/// Empty input, or an object without any tracked browser, means no custom
/// targets. Keys are matched ignoring case and values are kept as strings.
pub fn parse_custom_targets(input: &str) -> Result<Option<CustomTargets>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| {
        Error::configuration(format!("Invalid custom browser targets {input}: {reason}"))
            .with_detail("input", input)
    };

    let document: Value = serde_json::from_str(input).map_err(|e| invalid(e.to_string()))?;
    custom_targets_from_value(document).map_err(|_| invalid("expected a JSON object".to_string()))
}

/// Custom targets from an already-parsed document, such as a config table.
///
/// # Errors
/// Returns [`Error::Configuration`] if `document` is not an object.
pub fn custom_targets_from_value(document: Value) -> Result<Option<CustomTargets>> {
    let Value::Object(entries) = document else {
        return Err(Error::configuration("Custom browser targets must be an object"));
    };

    let targets: CustomTargets = entries
        .into_iter()
        .filter_map(|(key, value)| {
            let browser = Browser::from_key(&key)?;
            let version = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((browser, version))
        })
        .collect();

    Ok((!targets.is_empty()).then_some(targets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn support(pairs: &[(Browser, &str)]) -> BrowserSupport {
        pairs.iter().map(|(b, v)| (*b, v.to_string())).collect()
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(compare_versions("16.4", "16.4.1"), Ordering::Less);
        assert_eq!(compare_versions("17", "16.9"), Ordering::Greater);
        assert_eq!(compare_versions("2", "2.0"), Ordering::Equal);
        assert_eq!(compare_versions("110", "99"), Ordering::Greater);
        assert_eq!(compare_versions("15.4", "15.10"), Ordering::Less);
    }

    #[test]
    fn test_non_numeric_components_count_as_zero() {
        assert_eq!(compare_versions("preview", "0"), Ordering::Equal);
        assert_eq!(compare_versions("16.x", "16"), Ordering::Equal);
        assert_eq!(compare_versions("16beta", "16"), Ordering::Equal);
        assert_eq!(compare_versions("≤79", "0"), Ordering::Equal);
        assert_eq!(compare_versions("≤79", "70"), Ordering::Less);
        assert_eq!(compare_versions("", "0.0"), Ordering::Equal);
    }

    #[test]
    fn test_ranged_support_meets_any_target() {
        let check = check_targets(
            &support(&[(Browser::Edge, "≤79")]),
            &support(&[(Browser::Edge, "70")]),
        );
        assert!(check.is_compatible());
    }

    #[test]
    fn test_check_targets() {
        let feature = support(&[(Browser::Chrome, "95"), (Browser::Safari, "16.4")]);
        let targets: CustomTargets = support(&[
            (Browser::Chrome, "90"),
            (Browser::Firefox, "100"),
            (Browser::Safari, "17"),
        ]);

        let check = check_targets(&feature, &targets);
        assert!(!check.is_compatible());
        assert_eq!(
            check.messages(),
            vec![
                "chrome (requires 95+, target is 90)".to_string(),
                "firefox (not supported)".to_string(),
            ]
        );
    }

    #[test]
    fn test_equal_versions_are_compatible() {
        let feature = support(&[(Browser::Chrome, "105")]);
        let targets = support(&[(Browser::Chrome, "105.0")]);
        assert!(check_targets(&feature, &targets).is_compatible());
    }

    #[test]
    fn test_classify_by_status() {
        let config = BaselineConfig::default();

        let widely = classify(BaselineStatus::WidelyAvailable, None, &config).unwrap();
        assert_eq!((widely.severity, widely.blocking), (Severity::Info, false));

        let newly = classify(BaselineStatus::NewlyAvailable, None, &config).unwrap();
        assert_eq!((newly.severity, newly.blocking), (Severity::Warning, false));

        let limited = classify(BaselineStatus::Limited, None, &config).unwrap();
        assert_eq!((limited.severity, limited.blocking), (Severity::Error, false));

        let not_baseline = classify(BaselineStatus::NotBaseline, None, &config).unwrap();
        assert_eq!(not_baseline.severity, Severity::Error);
        assert!(not_baseline.scored);

        assert_eq!(classify(BaselineStatus::Unknown, None, &config), None);
    }

    #[test]
    fn test_classify_block_flags() {
        let config = BaselineConfig {
            block_newly_available: true,
            block_limited_availability: true,
            ..BaselineConfig::default()
        };

        assert!(classify(BaselineStatus::NewlyAvailable, None, &config).unwrap().blocking);
        assert!(classify(BaselineStatus::Limited, None, &config).unwrap().blocking);
        assert!(classify(BaselineStatus::NotBaseline, None, &config).unwrap().blocking);
        assert!(!classify(BaselineStatus::WidelyAvailable, None, &config).unwrap().blocking);
    }

    #[test]
    fn test_target_incompatibility_overrides_status() {
        let config = BaselineConfig::default();
        let check = check_targets(
            &support(&[(Browser::Chrome, "95")]),
            &support(&[(Browser::Chrome, "90")]),
        );

        let result = classify(BaselineStatus::WidelyAvailable, Some(&check), &config).unwrap();
        assert_eq!(result.severity, Severity::Error);
        assert!(result.blocking);
        assert!(!result.scored);

        let compatible = TargetCheck::default();
        let result = classify(BaselineStatus::WidelyAvailable, Some(&compatible), &config).unwrap();
        assert_eq!(result.severity, Severity::Info);
        assert!(result.scored);
    }

    #[test]
    fn test_score_weights() {
        assert_eq!(compatibility_score(0, 0, 0, 0), 100);
        assert_eq!(compatibility_score(1, 0, 0, 0), 100);
        assert_eq!(compatibility_score(0, 1, 0, 0), 75);
        assert_eq!(compatibility_score(0, 0, 1, 0), 25);
        assert_eq!(compatibility_score(0, 0, 0, 1), 0);
        assert_eq!(compatibility_score(1, 1, 0, 0), 88); // 87.5 rounds up
        assert_eq!(compatibility_score(1, 1, 1, 0), 67);
        assert_eq!(compatibility_score(2, 0, 0, 1), 67);
    }

    #[test]
    fn test_parse_custom_targets() {
        assert_eq!(parse_custom_targets("").unwrap(), None);
        assert_eq!(parse_custom_targets("   ").unwrap(), None);

        let targets = parse_custom_targets(r#"{"Chrome": "90", "SAFARI": 15.4, "opera": "80"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[&Browser::Chrome], "90");
        assert_eq!(targets[&Browser::Safari], "15.4");

        assert_eq!(parse_custom_targets(r#"{"opera": "80"}"#).unwrap(), None);
        assert_eq!(parse_custom_targets("{}").unwrap(), None);
    }

    #[test]
    fn test_parse_custom_targets_rejects_bad_input() {
        let err = parse_custom_targets("{chrome: 90").unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("{chrome: 90"));
        assert_eq!(err.details()["input"], "{chrome: 90");

        let err = parse_custom_targets(r#"["chrome"]"#).unwrap_err();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn test_custom_targets_from_value_coerces_numbers() {
        let targets = custom_targets_from_value(serde_json::json!({"firefox": 115, "edge": "110"}))
            .unwrap()
            .unwrap();
        assert_eq!(targets[&Browser::Firefox], "115");
        assert_eq!(targets[&Browser::Edge], "110");
        assert!(custom_targets_from_value(serde_json::json!("chrome")).is_err());
    }
}
