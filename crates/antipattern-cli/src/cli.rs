//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Detect structural antipatterns in SQL queries
#[derive(Parser, Debug)]
#[command(name = "antipattern")]
#[command(about = "Detect structural antipatterns in SQL queries", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files or directories of .sql files (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect
    #[arg(short, long, default_value = "bigquery", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Comma-separated list of detector codes to skip (e.g., NAIVE_REGEXP_CONTAINS)
    #[arg(long, value_delimiter = ',')]
    pub exclude_detectors: Vec<String>,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
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

impl From<DialectArg> for antipattern_core::Dialect {
    fn from(d: DialectArg) -> Self {
        use antipattern_core::Dialect;
        match d {
            DialectArg::Generic => Dialect::Generic,
            DialectArg::Ansi => Dialect::Ansi,
            DialectArg::Bigquery => Dialect::Bigquery,
            DialectArg::Clickhouse => Dialect::Clickhouse,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Duckdb => Dialect::Duckdb,
            DialectArg::Hive => Dialect::Hive,
            DialectArg::Mssql => Dialect::Mssql,
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable per-file findings
    Text,
    /// JSON array of per-file reports
    Json,
}
