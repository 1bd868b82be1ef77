//! Request and report types shared by the library and its front ends.

use crate::detector::config::DetectorConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// SQL dialect used to parse the input.
///
/// Detection does not depend on the dialect; it only decides which syntax the
/// parser accepts. BigQuery is the default because the detectors target
/// BigQuery workloads (backtick-quoted `project.dataset.table` paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Generic,
    Ansi,
    #[default]
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect,
            GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }
}

/// Input to [`crate::analyze`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// SQL text; may hold several `;`-separated statements.
    pub sql: String,
    #[serde(default)]
    pub dialect: Dialect,
    /// File name or other label carried through to the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default)]
    pub config: DetectorConfig,
}

/// One diagnostic message emitted by a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Code of the detector that produced the message.
    pub detector: String,
    pub message: String,
}

impl Finding {
    pub fn new(detector: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            detector: detector.into(),
            message: message.into(),
        }
    }
}

/// Findings for a single parsed statement, in detection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementReport {
    /// Zero-based position of the statement in the input.
    pub statement_index: usize,
    pub findings: Vec<Finding>,
}

/// Combined findings for every statement of one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub statements: Vec<StatementReport>,
}

impl Report {
    pub fn finding_count(&self) -> usize {
        self.statements.iter().map(|s| s.findings.len()).sum()
    }

    pub fn has_findings(&self) -> bool {
        self.statements.iter().any(|s| !s.findings.is_empty())
    }

    /// All messages across statements, in statement then detection order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.statements
            .iter()
            .flat_map(|s| s.findings.iter().map(|f| f.message.as_str()))
    }

    /// Newline-joined messages; empty when nothing was found.
    pub fn to_text(&self) -> String {
        self.messages().collect::<Vec<_>>().join("\n")
    }
}
