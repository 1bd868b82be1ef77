//! Output formatting modules.

pub mod json;
pub mod text;

use antipattern_core::Report;

/// Outcome of analyzing one input.
pub struct FileResult {
    pub name: String,
    pub outcome: Result<Report, String>,
}

impl FileResult {
    pub fn finding_count(&self) -> usize {
        self.outcome.as_ref().map_or(0, Report::finding_count)
    }

    pub fn is_clean(&self) -> bool {
        matches!(&self.outcome, Ok(report) if !report.has_findings())
    }
}

pub use json::format_json;
pub use text::format_text;
