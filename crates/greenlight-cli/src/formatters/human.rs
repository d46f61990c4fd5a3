//! Human-readable terminal formatter.

use colored::*;
use greenlight_core::{CompatibilityReport, CompatibilityResult, Severity};
use std::fmt::Write;

pub struct HumanFormatter;

fn score_line(score: u8) -> ColoredString {
    let text = format!("{score}/100");
    match score {
        90.. => text.green().bold(),
        70..=89 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn result_marker(result: &CompatibilityResult) -> ColoredString {
    if result.blocking {
        return "✗".red();
    }
    match result.severity {
        Severity::Info => "✓".green(),
        Severity::Warning => "!".yellow(),
        Severity::Error => "✗".bright_red(),
    }
}

pub fn render_human(report: &CompatibilityReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "Baseline Compatibility".bold());
    let _ = writeln!(out, "======================\n");
    let _ = writeln!(out, "Score: {}", score_line(report.score));
    let _ = writeln!(out, "  Features detected: {}", report.total_features);
    let _ = writeln!(out, "  Blocking:          {}", report.blocking_count);
    let _ = writeln!(out, "  Warnings:          {}", report.warning_count);
    let _ = writeln!(out, "  Errors:            {}", report.error_count);
    let _ = writeln!(out, "  Safe:              {}", report.info_count);

    if report.results.is_empty() {
        let _ = writeln!(out, "\n{}", "No web features detected in added lines.".bright_black());
        return out;
    }

    for (path, results) in report.results_by_file() {
        let _ = writeln!(out, "\n{}", path.cyan());
        for result in results {
            let _ = write!(
                out,
                "  {} {:28} {}",
                result_marker(result),
                result.feature.name,
                result.feature.status.display_name().bright_black()
            );
            if let Some(line) = result.line {
                let _ = write!(out, " {}", format!("(line {line})").bright_black());
            }
            if result.blocking {
                let _ = write!(out, " {}", "blocking".red().bold());
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::{BaselineFeature, BaselineStatus, BrowserSupport, ReportBuilder};

    #[test]
    fn test_groups_results_by_file() {
        colored::control::set_override(false);

        let mut builder = ReportBuilder::new();
        for (path, id, blocking) in [("a.css", "grid", false), ("b.css", "has", true), ("a.css", "subgrid", false)] {
            builder.push(
                CompatibilityResult {
                    feature: BaselineFeature {
                        id: id.to_string(),
                        name: id.to_string(),
                        description: None,
                        status: BaselineStatus::WidelyAvailable,
                        baseline_year: None,
                        support: BrowserSupport::new(),
                        mdn_url: None,
                        spec_url: None,
                    },
                    file_path: path.to_string(),
                    line: Some(3),
                    severity: Severity::Info,
                    blocking,
                },
                Some(BaselineStatus::WidelyAvailable),
            );
        }

        let rendered = render_human(&builder.finish());
        let a = rendered.find("a.css").unwrap();
        let b = rendered.find("b.css").unwrap();
        assert!(a < b);
        assert!(rendered[a..b].contains("subgrid"));
        assert!(rendered[b..].contains("blocking"));
        assert!(rendered.contains("(line 3)"));
    }
}
