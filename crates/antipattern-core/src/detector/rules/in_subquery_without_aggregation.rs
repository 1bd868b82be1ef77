//! IN_SUBQUERY_WITHOUT_AGGREGATION: `IN (SELECT ...)` without DISTINCT or GROUP BY.
//!
//! A membership test against a subquery that neither de-duplicates nor groups
//! makes the engine carry every duplicate row into the semi-join. Either
//! `SELECT DISTINCT` or a `GROUP BY` in the subquery suppresses the finding.
//! Only WHERE clauses are inspected, through `AND`/`OR`/`NOT`, parentheses and
//! `IS [NOT] TRUE`/`FALSE`/`UNKNOWN`.

use crate::detector::codes;
use crate::detector::walk::{walk_statement, Node, MAX_WALK_DEPTH};
use crate::detector::Detector;
use sqlparser::ast::*;

const MESSAGE: &str = "Subquery in the WHERE clause without aggregation.";

pub struct InSubqueryWithoutAggregation;

impl Detector for InSubqueryWithoutAggregation {
    fn code(&self) -> &'static str {
        codes::IN_SUBQUERY_WITHOUT_AGGREGATION
    }

    fn name(&self) -> &'static str {
        "IN subquery without aggregation"
    }

    fn description(&self) -> &'static str {
        "IN / NOT IN subquery in a WHERE clause without DISTINCT or GROUP BY."
    }

    fn run(&self, stmt: &Statement) -> Vec<String> {
        let mut messages = Vec::new();
        walk_statement(stmt, &mut |node| {
            if let Node::Predicate(predicate) = node {
                check_predicate(predicate, &mut messages, 0);
            }
        });
        messages
    }
}

/// Nested subqueries are not entered here: their WHERE clauses arrive as
/// separate predicates from the walker.
fn check_predicate(expr: &Expr, messages: &mut Vec<String>, depth: usize) {
    if depth > MAX_WALK_DEPTH {
        return;
    }
    match expr {
        Expr::InSubquery { subquery, .. } => {
            if is_unaggregated(subquery) {
                messages.push(MESSAGE.to_string());
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            check_predicate(left, messages, depth + 1);
            check_predicate(right, messages, depth + 1);
        }
        Expr::UnaryOp { expr: inner, .. }
        | Expr::Nested(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner) => check_predicate(inner, messages, depth + 1),
        _ => {}
    }
}

/// True for a plain SELECT with neither DISTINCT nor GROUP BY.
///
/// Set operations and VALUES bodies are not judged.
fn is_unaggregated(query: &Query) -> bool {
    match query.body.as_ref() {
        SetExpr::Select(select) => {
            let has_distinct = matches!(
                select.distinct,
                Some(Distinct::Distinct) | Some(Distinct::On(_))
            );
            let has_group_by = match &select.group_by {
                GroupByExpr::All(_) => true,
                GroupByExpr::Expressions(exprs, _) => !exprs.is_empty(),
            };
            !has_distinct && !has_group_by
        }
        SetExpr::Query(inner) => is_unaggregated(inner),
        _ => false,
    }
}
