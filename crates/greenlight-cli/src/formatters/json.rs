//! JSON formatter for compatibility reports.

use greenlight_core::CompatibilityReport;
use serde_json::json;

pub struct JsonFormatter;

pub fn render_json(report: &CompatibilityReport) -> String {
    let value = json!({
        "score": report.score,
        "totalFeatures": report.total_features,
        "blockingCount": report.blocking_count,
        "warningCount": report.warning_count,
        "infoCount": report.info_count,
        "errorCount": report.error_count,
        "statusCounts": report.status_counts,
        "results": report.results,
    });

    match serde_json::to_string_pretty(&value) {
        Ok(json) => json,
        Err(e) => json!({ "error": format!("Error serializing report: {e}") }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::ReportBuilder;

    #[test]
    fn test_empty_report_shape() {
        let rendered = render_json(&ReportBuilder::new().finish());
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["score"], 100);
        assert_eq!(value["totalFeatures"], 0);
        assert_eq!(value["statusCounts"]["notBaseline"], 0);
        assert!(value["results"].as_array().unwrap().is_empty());
    }
}
