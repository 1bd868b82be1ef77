use crate::error::ParseError;
use crate::types::Dialect;
use sqlparser::ast::Statement;
use sqlparser::parser::Parser;

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    Parser::parse_sql(sqlparser_dialect.as_ref(), sql)
        .map_err(|err| ParseError::from(err).with_dialect(dialect))
}

/// Parse SQL using the default (BigQuery) dialect
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, ParseError> {
    parse_sql_with_dialect(sql, Dialect::default())
}
