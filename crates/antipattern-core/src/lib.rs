//! Structural SQL antipattern detection.
//!
//! SQL text is parsed with `sqlparser` and each statement is handed to a set of
//! independent detectors. Every detector walks the AST read-only and returns
//! human-readable messages in detection order:
//!
//! - [`detector::rules::cte_multiple_references`]: a CTE alias referenced more
//!   than once.
//! - [`detector::rules::naive_regexp_contains`]: `REGEXP_CONTAINS` calls.
//! - [`detector::rules::in_subquery_without_aggregation`]: `IN (SELECT ...)`
//!   in a WHERE clause without DISTINCT or GROUP BY.
//!
//! ```
//! use antipattern_core::{analyze, AnalyzeRequest};
//!
//! let report = analyze(&AnalyzeRequest {
//!     sql: "SELECT * FROM t WHERE REGEXP_CONTAINS(name, 'abc')".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! assert_eq!(report.finding_count(), 1);
//! ```

pub mod analyze;
pub mod detector;
pub mod error;
pub mod parser;
pub mod types;

pub use analyze::analyze;
pub use detector::config::DetectorConfig;
pub use detector::rules::all_detectors;
pub use detector::{codes as detector_codes, Detector, DetectorSet};
pub use error::{ParseError, ParseErrorKind, Position};
pub use parser::{parse_sql, parse_sql_with_dialect};
pub use types::{AnalyzeRequest, Dialect, Finding, Report, StatementReport};
