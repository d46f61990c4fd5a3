//! Output formatters for compatibility reports.

pub mod human;
pub mod json;
pub mod markdown;

use greenlight_core::CompatibilityReport;

pub use human::HumanFormatter;
pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;

/// Trait for rendering a compatibility report
pub trait Formatter {
    fn render(&self, report: &CompatibilityReport) -> String;

    /// Render and print to stdout
    fn print(&self, report: &CompatibilityReport) {
        println!("{}", self.render(report));
    }
}

impl Formatter for HumanFormatter {
    fn render(&self, report: &CompatibilityReport) -> String {
        human::render_human(report)
    }
}

impl Formatter for JsonFormatter {
    fn render(&self, report: &CompatibilityReport) -> String {
        json::render_json(report)
    }
}

impl Formatter for MarkdownFormatter {
    fn render(&self, report: &CompatibilityReport) -> String {
        markdown::render_comment(report)
    }
}

/// Output format for `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Human => Box::new(HumanFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
        }
    }
}
