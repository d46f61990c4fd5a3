//! Markdown formatter for the pull request comment.

use greenlight_core::polyfills::{suggestion_for, PolyfillSuggestion};
use greenlight_core::{
    BaselineStatus, Browser, CompatibilityReport, CompatibilityResult, Severity, COMMENT_MARKER,
};
use std::fmt::Write;

pub const COMMENT_TITLE: &str = "🚦 Baseline Compatibility Report";

/// Cells in the score progress bar
const PROGRESS_CELLS: usize = 20;

const PROJECT_URL: &str = "https://github.com/greenlightci/greenlight";

pub struct MarkdownFormatter;

/// Traffic light for a score
pub fn score_emoji(score: u8) -> &'static str {
    match score {
        90.. => "🟢",
        70..=89 => "🟡",
        _ => "🔴",
    }
}

/// `` `██████░░░░…` 30% ``, one cell per five points
pub fn progress_bar(score: u8) -> String {
    let filled = (usize::from(score) / 5).min(PROGRESS_CELLS);
    format!(
        "`{}{}` {score}%",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled)
    )
}

pub fn status_emoji(status: BaselineStatus) -> &'static str {
    match status {
        BaselineStatus::WidelyAvailable => "✅",
        BaselineStatus::NewlyAvailable => "⚠️",
        BaselineStatus::Limited => "❌",
        BaselineStatus::NotBaseline => "🚫",
        BaselineStatus::Unknown => "❓",
    }
}

/// shields.io badge for a status, with the Baseline year when known
pub fn status_badge(status: BaselineStatus, year: Option<&str>) -> String {
    let year = year.map(|y| format!("%20({y})")).unwrap_or_default();
    match status {
        BaselineStatus::WidelyAvailable => format!(
            "![Widely Available](https://img.shields.io/badge/Baseline-Widely%20Available{year}-brightgreen)"
        ),
        BaselineStatus::NewlyAvailable => format!(
            "![Newly Available](https://img.shields.io/badge/Baseline-Newly%20Available{year}-yellow)"
        ),
        BaselineStatus::Limited => {
            "![Limited](https://img.shields.io/badge/Baseline-Limited%20Availability-orange)".to_string()
        }
        BaselineStatus::NotBaseline => {
            "![Not Baseline](https://img.shields.io/badge/Status-Not%20Baseline-red)".to_string()
        }
        BaselineStatus::Unknown => {
            "![Unknown](https://img.shields.io/badge/Status-Unknown-lightgrey)".to_string()
        }
    }
}

fn ok_or(count: usize, flag: &'static str) -> &'static str {
    if count > 0 {
        flag
    } else {
        "✅"
    }
}

/// Render the full comment body, starting with [`COMMENT_MARKER`]
pub fn render_comment(report: &CompatibilityReport) -> String {
    let mut out = String::new();
    let score = report.score;

    let _ = writeln!(out, "{COMMENT_MARKER}\n");
    let _ = writeln!(out, "# {COMMENT_TITLE}\n");
    let _ = writeln!(out, "## Compatibility Score: {} **{score}/100**\n", score_emoji(score));
    let _ = writeln!(out, "{}\n", progress_bar(score));

    out.push_str("| Metric | Count | Status |\n");
    out.push_str("|--------|-------|--------|\n");
    let _ = writeln!(out, "| Features Detected | {} | ℹ️ |", report.total_features);
    let _ = writeln!(
        out,
        "| Blocking Issues | {} | {} |",
        report.blocking_count,
        ok_or(report.blocking_count, "❌")
    );
    let _ = writeln!(
        out,
        "| Warnings | {} | {} |",
        report.warning_count,
        ok_or(report.warning_count, "⚠️")
    );
    let _ = writeln!(out, "| Safe to Use | {} | ✅ |\n", report.info_count);

    if report.results.is_empty() {
        out.push_str(
            "> ✅ **Great news!** No web features detected in this PR that require compatibility checking.\n\n",
        );
        out.push_str(
            "This PR doesn't introduce any new web platform features that need baseline validation.\n",
        );
        let _ = write!(out, "\n---\n🤖 *Powered by [GreenLight]({PROJECT_URL})*\n");
        return out;
    }

    let blocking: Vec<_> = report.results.iter().filter(|r| r.blocking).collect();
    let warnings: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.blocking && r.severity == Severity::Warning)
        .collect();
    let errors: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.blocking && r.severity == Severity::Error)
        .collect();
    let safe: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.blocking && r.severity == Severity::Info)
        .collect();

    if !blocking.is_empty() {
        out.push_str("## ❌ Blocking Issues\n\n");
        out.push_str("> **Action Required:** The following features need attention before merging.\n\n");
        for result in &blocking {
            out.push_str(&render_result(result));
        }
    }

    if !warnings.is_empty() || !errors.is_empty() {
        out.push_str("## ⚠️ Warnings\n\n");
        out.push_str(
            "> **Recommendation:** These features are not yet widely available. Consider adding polyfills for broader support.\n\n",
        );
        for result in warnings.iter().chain(&errors) {
            out.push_str(&render_result(result));
        }
    }

    if !safe.is_empty() {
        let plural = if safe.len() > 1 { "s" } else { "" };
        out.push_str("## ✅ Safe to Use\n\n");
        let _ = write!(
            out,
            "<details>\n<summary><b>View {} widely available feature{plural}</b> (click to expand)</summary>\n\n",
            safe.len()
        );
        for result in &safe {
            out.push_str(&render_result(result));
        }
        out.push_str("</details>\n\n");
    }

    out.push_str("---\n");
    out.push_str("\n### 📚 Resources\n\n");
    out.push_str("- [Baseline Documentation](https://web.dev/baseline/)\n");
    out.push_str("- [Browser Compatibility Data](https://github.com/mdn/browser-compat-data)\n");
    out.push_str("- [Can I Use](https://caniuse.com/)\n\n");
    let _ = writeln!(
        out,
        "<sub>🤖 Generated by [GreenLight]({PROJECT_URL}) | Need help? [Open an issue]({PROJECT_URL}/issues)</sub>"
    );
    out
}

fn render_result(result: &CompatibilityResult) -> String {
    let feature = &result.feature;
    let mut out = String::new();

    let _ = writeln!(out, "#### {} `{}`\n", status_emoji(feature.status), feature.name);
    let _ = writeln!(out, "{}\n", status_badge(feature.status, feature.baseline_year.as_deref()));

    let _ = write!(out, "- **Location:** `{}`", result.file_path);
    if let Some(line) = result.line {
        let _ = write!(out, ":{line}");
    }
    out.push('\n');

    if !feature.support.is_empty() {
        let support: Vec<String> = Browser::all()
            .iter()
            .filter_map(|browser| {
                feature
                    .support
                    .get(browser)
                    .map(|version| format!("{} {version}+", browser.display_name()))
            })
            .collect();
        let _ = writeln!(out, "- **Browser Support:** {}", support.join(" • "));
    }

    if feature.status != BaselineStatus::WidelyAvailable && result.severity != Severity::Info {
        if let Some(suggestion) = suggestion_for(&feature.id) {
            out.push_str("\n<details>\n<summary>💡 <b>Polyfill & Fallback Options</b></summary>\n\n");
            out.push_str(&render_polyfill(suggestion));
            out.push_str("</details>\n");
        }
    }

    if let Some(mdn) = &feature.mdn_url {
        let _ = write!(out, "\n📖 [View on MDN]({mdn})");
    }
    if let Some(spec) = &feature.spec_url {
        let _ = write!(out, " • [Specification]({spec})");
    }
    out.push_str("\n\n");
    out
}

pub fn render_polyfill(suggestion: &PolyfillSuggestion) -> String {
    let mut out = String::new();

    if !suggestion.fallback_strategy.is_empty() {
        let _ = write!(out, "**💡 Fallback Strategy:**\n{}\n\n", suggestion.fallback_strategy);
    }
    if !suggestion.npm_packages.is_empty() {
        out.push_str("**📦 NPM Packages:**\n");
        for package in suggestion.npm_packages {
            let _ = write!(out, "```bash\nnpm install {package}\n```\n");
        }
    }
    if !suggestion.cdn_links.is_empty() {
        out.push_str("**🔗 CDN Links:**\n");
        for link in suggestion.cdn_links {
            let _ = writeln!(out, "- {link}");
        }
    }
    if !suggestion.has_packages() && !suggestion.polyfills.is_empty() {
        let _ = writeln!(out, "**Polyfills:** {}", suggestion.polyfills.join(", "));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::{BaselineFeature, BrowserSupport, ReportBuilder};

    fn result(id: &str, status: BaselineStatus, severity: Severity, blocking: bool) -> CompatibilityResult {
        let mut support = BrowserSupport::new();
        support.insert(Browser::Safari, "16".to_string());
        support.insert(Browser::Chrome, "105".to_string());

        CompatibilityResult {
            feature: BaselineFeature {
                id: id.to_string(),
                name: id.to_string(),
                description: None,
                status,
                baseline_year: Some("2023".to_string()),
                support,
                mdn_url: Some(format!("https://developer.mozilla.org/{id}")),
                spec_url: None,
            },
            file_path: "src/app.css".to_string(),
            line: Some(4),
            severity,
            blocking,
        }
    }

    fn report(results: Vec<(CompatibilityResult, BaselineStatus)>) -> CompatibilityReport {
        let mut builder = ReportBuilder::new();
        for (result, status) in results {
            builder.push(result, Some(status));
        }
        builder.finish()
    }

    #[test]
    fn test_score_emoji_thresholds() {
        assert_eq!(score_emoji(100), "🟢");
        assert_eq!(score_emoji(90), "🟢");
        assert_eq!(score_emoji(89), "🟡");
        assert_eq!(score_emoji(70), "🟡");
        assert_eq!(score_emoji(69), "🔴");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(100), format!("`{}` 100%", "█".repeat(20)));
        assert_eq!(progress_bar(0), format!("`{}` 0%", "░".repeat(20)));
        assert_eq!(progress_bar(74), format!("`{}{}` 74%", "█".repeat(14), "░".repeat(6)));
    }

    #[test]
    fn test_status_badge_includes_year() {
        let badge = status_badge(BaselineStatus::NewlyAvailable, Some("2024"));
        assert!(badge.contains("Newly%20Available%20(2024)-yellow"));
        assert!(status_badge(BaselineStatus::Limited, Some("2024")).contains("Limited%20Availability"));
    }

    #[test]
    fn test_empty_report() {
        let comment = render_comment(&report(vec![]));
        assert!(comment.starts_with(COMMENT_MARKER));
        assert!(comment.contains("## Compatibility Score: 🟢 **100/100**"));
        assert!(comment.contains("No web features detected"));
        assert!(!comment.contains("Blocking Issues\n\n>"));
    }

    #[test]
    fn test_sections_and_polyfills() {
        let comment = render_comment(&report(vec![
            (
                result("container-queries", BaselineStatus::NewlyAvailable, Severity::Warning, true),
                BaselineStatus::NewlyAvailable,
            ),
            (
                result("grid", BaselineStatus::WidelyAvailable, Severity::Info, false),
                BaselineStatus::WidelyAvailable,
            ),
        ]));

        assert!(comment.contains("## ❌ Blocking Issues"));
        assert!(comment.contains("| Blocking Issues | 1 | ❌ |"));
        assert!(comment.contains("View 1 widely available feature</b>"));
        assert!(comment.contains("- **Location:** `src/app.css`:4"));
        assert!(comment.contains("- **Browser Support:** Chrome 105+ • Safari 16+"));
        assert!(comment.contains("npm install container-query-polyfill"));
        assert!(comment.contains("📖 [View on MDN](https://developer.mozilla.org/grid)"));

        // Widely available features never carry polyfill details.
        let safe = &comment[comment.find("## ✅ Safe to Use").unwrap()..];
        assert!(!safe.contains("Polyfill & Fallback Options"));
    }

    #[test]
    fn test_limited_features_are_listed_as_warnings() {
        let comment = render_comment(&report(vec![(
            result("has", BaselineStatus::Limited, Severity::Error, false),
            BaselineStatus::Limited,
        )]));
        assert!(comment.contains("## ⚠️ Warnings"));
        assert!(comment.contains("#### ❌ `has`"));
        assert!(comment.contains("**💡 Fallback Strategy:**"));
    }
}
