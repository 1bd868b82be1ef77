//! Stable detector codes.

/// A CTE alias is referenced more than once, so its body is evaluated repeatedly.
pub const CTE_MULTIPLE_REFERENCES: &str = "CTE_MULTIPLE_REFERENCES";

/// `REGEXP_CONTAINS` is used where `LIKE` would do.
pub const NAIVE_REGEXP_CONTAINS: &str = "NAIVE_REGEXP_CONTAINS";

/// An `IN`/`NOT IN` subquery in a WHERE clause neither de-duplicates nor groups.
pub const IN_SUBQUERY_WITHOUT_AGGREGATION: &str = "IN_SUBQUERY_WITHOUT_AGGREGATION";
