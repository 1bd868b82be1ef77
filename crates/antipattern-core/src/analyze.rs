//! Runs the detector set over every statement of a SQL input.

use crate::detector::DetectorSet;
use crate::error::ParseError;
use crate::parser::parse_sql_with_dialect;
use crate::types::{AnalyzeRequest, Report, StatementReport};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Parses the request's SQL and runs every enabled detector on each statement.
///
/// Parsing is all-or-nothing for the input: a syntax error anywhere yields
/// `Err` and no findings. Detection itself cannot fail.
pub fn analyze(request: &AnalyzeRequest) -> Result<Report, ParseError> {
    let statements = parse_sql_with_dialect(&request.sql, request.dialect)?;
    let detectors = DetectorSet::new(&request.config);

    let statements = statements
        .iter()
        .enumerate()
        .map(|(statement_index, stmt)| {
            let findings = detectors.run(stmt);
            #[cfg(feature = "tracing")]
            debug!(statement_index, findings = findings.len(), "statement analyzed");
            StatementReport {
                statement_index,
                findings,
            }
        })
        .collect();

    Ok(Report {
        source_name: request.source_name.clone(),
        statements,
    })
}
