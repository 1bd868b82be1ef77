//! Detector implementations and registry.

use super::Detector;

pub mod cte_multiple_references;
pub mod in_subquery_without_aggregation;
pub mod naive_regexp_contains;

/// Returns every detector, in reporting order.
pub fn all_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(cte_multiple_references::CteMultipleReferences),
        Box::new(naive_regexp_contains::NaiveRegexpContains),
        Box::new(in_subquery_without_aggregation::InSubqueryWithoutAggregation),
    ]
}
