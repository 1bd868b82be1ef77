//! CTE_MULTIPLE_REFERENCES: CTE referenced more than once.
//!
//! BigQuery evaluates a non-recursive CTE once per reference, so an alias read
//! from several places runs its body several times. Materializing the result
//! into a temporary table is usually cheaper.
//!
//! Counting happens in two passes over one statement:
//!
//! 1. The top-level WITH clause, entry by entry in declaration order. Each alias
//!    is registered with count 0, then the entry's body is scanned if it is a
//!    plain `SELECT ... FROM <table path>` (no join, no comma list, no derived
//!    table). After every scanned entry, all aliases whose count exceeds 1 are
//!    reported, so an alias that keeps gaining references is reported again
//!    with its new count.
//! 2. Every table path in the main query body (subqueries and joins included).
//!    After each path, the aliases it referenced are reported when their count
//!    now exceeds 1.

use crate::detector::codes;
use crate::detector::walk::{statement_query, walk_query_body, Node};
use crate::detector::Detector;
use indexmap::IndexMap;
use sqlparser::ast::*;
use sqlparser::tokenizer::Span;
#[cfg(feature = "tracing")]
use tracing::debug;

pub struct CteMultipleReferences;

impl Detector for CteMultipleReferences {
    fn code(&self) -> &'static str {
        codes::CTE_MULTIPLE_REFERENCES
    }

    fn name(&self) -> &'static str {
        "CTE with multiple references"
    }

    fn description(&self) -> &'static str {
        "A CTE referenced more than once is evaluated once per reference."
    }

    fn run(&self, stmt: &Statement) -> Vec<String> {
        let Some(query) = statement_query(stmt) else {
            return Vec::new();
        };
        let Some(with) = &query.with else {
            return Vec::new();
        };

        let mut counts = AliasCounts::default();
        let mut messages = Vec::new();

        for cte in &with.cte_tables {
            counts.register(&cte.alias.name);

            let Some(path) = single_table_path(&cte.query) else {
                #[cfg(feature = "tracing")]
                debug!(alias = %cte.alias.name, "CTE body is not a single table path, not scanned");
                continue;
            };
            counts.scan(path);
            counts.report_all(&mut messages);
        }

        walk_query_body(
            query,
            &mut |node| {
                if let Node::TablePath(path) = node {
                    let touched = counts.scan(path);
                    counts.report(&touched, &mut messages);
                }
            },
            0,
        );

        messages
    }
}

fn message(alias: &str, count: usize) -> String {
    format!("CTE with multiple references: alias {alias} is referenced {count} times.")
}

/// Reference counts keyed by lower-cased alias, in declaration order.
#[derive(Default)]
struct AliasCounts {
    counts: IndexMap<String, usize>,
}

impl AliasCounts {
    /// Registers an alias with count 0, resetting it if already present.
    fn register(&mut self, alias: &Ident) {
        self.counts.insert(alias.value.to_lowercase(), 0);
    }

    /// Counts every path component naming a registered alias.
    ///
    /// Returns the indices of the aliases incremented, without repeats.
    fn scan(&mut self, path: &ObjectName) -> Vec<usize> {
        let mut touched = Vec::new();
        for name in path_components(path) {
            if let Some((index, _, count)) = self.counts.get_full_mut(&name) {
                *count += 1;
                if !touched.contains(&index) {
                    touched.push(index);
                }
            }
        }
        touched
    }

    fn report_all(&self, messages: &mut Vec<String>) {
        for (alias, &count) in &self.counts {
            if count > 1 {
                messages.push(message(alias, count));
            }
        }
    }

    fn report(&self, indices: &[usize], messages: &mut Vec<String>) {
        for &index in indices {
            if let Some((alias, &count)) = self.counts.get_index(index) {
                if count > 1 {
                    messages.push(message(alias, count));
                }
            }
        }
    }
}

/// Lower-cased components of a table path, as written.
///
/// The BigQuery parser splits a quoted `` `project.dataset.table` `` into one
/// part per segment, all carrying the span of the quoted token. Those parts are
/// joined back so the quoted path stays a single name and its last segment
/// cannot match a CTE alias.
fn path_components(path: &ObjectName) -> Vec<String> {
    let mut components: Vec<(String, Option<Span>)> = Vec::new();
    for ident in path.0.iter().filter_map(ObjectNamePart::as_ident) {
        let token = (ident.quote_style.is_some() && ident.span != Span::empty())
            .then_some(ident.span);
        let value = ident.value.to_lowercase();
        match components.last_mut() {
            Some((name, Some(span))) if token == Some(*span) => {
                name.push('.');
                name.push_str(&value);
            }
            _ => components.push((value, token)),
        }
    }
    components.into_iter().map(|(name, _)| name).collect()
}

/// The table path of a `SELECT ... FROM <path>` body, if that is its shape.
fn single_table_path(query: &Query) -> Option<&ObjectName> {
    let SetExpr::Select(select) = query.body.as_ref() else {
        return None;
    };
    let [table] = select.from.as_slice() else {
        return None;
    };
    if !table.joins.is_empty() {
        return None;
    }
    match &table.relation {
        TableFactor::Table { name, .. } => Some(name),
        _ => None,
    }
}
