//! NAIVE_REGEXP_CONTAINS: `REGEXP_CONTAINS` call.
//!
//! Regular expression matching is far more expensive than `LIKE`. Every call
//! site is reported, so a query calling the function N times gets N identical
//! messages.

use crate::detector::codes;
use crate::detector::walk::{walk_statement, Node};
use crate::detector::Detector;
use sqlparser::ast::*;

const REGEXP_CONTAINS_MESSAGE: &str =
    "REGEXP_CONTAINS : Prefer LIKE when the full power of regex is not needed (e.g. wildcard matching).";
const REGEXP_CONTAINS_NAME: &str = "regexp_contains";

pub struct NaiveRegexpContains;

impl Detector for NaiveRegexpContains {
    fn code(&self) -> &'static str {
        codes::NAIVE_REGEXP_CONTAINS
    }

    fn name(&self) -> &'static str {
        "Naive REGEXP_CONTAINS"
    }

    fn description(&self) -> &'static str {
        "REGEXP_CONTAINS used where LIKE wildcard matching would suffice."
    }

    fn run(&self, stmt: &Statement) -> Vec<String> {
        let mut messages = Vec::new();
        walk_statement(stmt, &mut |node| {
            if let Node::Function(func) = node {
                // One message per call, however many name parts match.
                if func
                    .name
                    .0
                    .iter()
                    .filter_map(ObjectNamePart::as_ident)
                    .any(is_regexp_contains)
                {
                    messages.push(REGEXP_CONTAINS_MESSAGE.to_string());
                }
            }
        });
        messages
    }
}

/// Unquoted names fold to lower case; quoted names must match exactly.
fn is_regexp_contains(ident: &Ident) -> bool {
    match ident.quote_style {
        None => ident.value.to_lowercase() == REGEXP_CONTAINS_NAME,
        Some(_) => ident.value == REGEXP_CONTAINS_NAME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sql;

    fn check_sql(sql: &str) -> Vec<String> {
        let stmts = parse_sql(sql).unwrap();
        let mut messages = Vec::new();
        for stmt in &stmts {
            messages.extend(NaiveRegexpContains.run(stmt));
        }
        messages
    }

    #[test]
    fn test_single_call() {
        let messages = check_sql("SELECT * FROM t WHERE REGEXP_CONTAINS(col, 'pattern')");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_each_call_site_is_reported() {
        let messages = check_sql(
            "SELECT REGEXP_CONTAINS(a, 'x') AS m FROM t WHERE REGEXP_CONTAINS(b, 'y')",
        );
        assert_eq!(
            messages,
            vec![REGEXP_CONTAINS_MESSAGE, REGEXP_CONTAINS_MESSAGE]
        );
    }

    #[test]
    fn test_no_call() {
        assert!(check_sql("SELECT * FROM t WHERE col LIKE '%x%'").is_empty());
    }

    #[test]
    fn test_other_regexp_functions_are_ignored() {
        let messages = check_sql("SELECT REGEXP_EXTRACT(a, 'x'), REGEXP_REPLACE(a, 'x', 'y') FROM t");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_lower_case_call() {
        let messages = check_sql("SELECT * FROM t WHERE regexp_contains(col, 'x')");
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_qualified_name() {
        let messages = check_sql("SELECT * FROM t WHERE SAFE.REGEXP_CONTAINS(col, 'x')");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_calls_nested_in_arguments_and_subqueries() {
        let messages = check_sql(
            "WITH a AS (SELECT * FROM t WHERE REGEXP_CONTAINS(x, 'a'))
            SELECT COALESCE(REGEXP_CONTAINS(LOWER(y), 'b'), FALSE)
            FROM a
            WHERE id IN (SELECT id FROM u WHERE REGEXP_CONTAINS(z, 'c'))",
        );
        assert_eq!(messages.len(), 3);
    }

    #[test]
    fn test_call_in_window_partition() {
        let messages = check_sql(
            "SELECT ROW_NUMBER() OVER (PARTITION BY REGEXP_CONTAINS(a, 'x') ORDER BY b) FROM t",
        );
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_window_order_by() {
        let messages =
            check_sql("SELECT SUM(b) OVER (ORDER BY REGEXP_CONTAINS(a, 'x')) FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_struct_literal() {
        let messages = check_sql("SELECT STRUCT(REGEXP_CONTAINS(a, 'x') AS m) FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_array_subscript() {
        let messages = check_sql("SELECT arr[OFFSET(REGEXP_CONTAINS(a, 'x'))] FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_aggregate_order_by() {
        let messages = check_sql("SELECT ARRAY_AGG(a ORDER BY REGEXP_CONTAINS(a, 'x')) FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_wildcard_replace() {
        let messages = check_sql("SELECT * REPLACE (REGEXP_CONTAINS(a, 'x') AS a) FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_in_field_access_root() {
        let messages = check_sql("SELECT (SELECT AS STRUCT REGEXP_CONTAINS(a, 'x') AS m).m FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_call_inside_trim() {
        let messages = check_sql("SELECT TRIM(CAST(REGEXP_CONTAINS(a, 'x') AS STRING)) FROM t");
        assert_eq!(messages, vec![REGEXP_CONTAINS_MESSAGE]);
    }

    #[test]
    fn test_calls_in_dml() {
        let messages = check_sql(
            "DELETE FROM t WHERE REGEXP_CONTAINS(a, 'x'); \
             UPDATE t SET b = REGEXP_CONTAINS(a, 'y') WHERE REGEXP_CONTAINS(c, 'z'); \
             MERGE INTO t USING u ON t.id = u.id \
             WHEN MATCHED AND REGEXP_CONTAINS(u.a, 'x') THEN DELETE",
        );
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_quoted_name_must_match_exactly() {
        assert!(is_regexp_contains(&Ident::new("REGEXP_CONTAINS")));
        assert!(is_regexp_contains(&Ident::new("Regexp_Contains")));
        assert!(is_regexp_contains(&Ident::with_quote('`', "regexp_contains")));
        assert!(!is_regexp_contains(&Ident::with_quote('`', "REGEXP_CONTAINS")));
        assert!(!is_regexp_contains(&Ident::new("regexp_contains_all")));
    }

    #[test]
    fn test_run_is_idempotent() {
        let stmt = parse_sql("SELECT REGEXP_CONTAINS(a, 'x') FROM t")
            .unwrap()
            .remove(0);
        assert_eq!(NaiveRegexpContains.run(&stmt), NaiveRegexpContains.run(&stmt));
    }
}
