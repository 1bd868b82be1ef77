//! Depth-first AST walker shared by the detectors.
//!
//! The walker yields the handful of node kinds detection cares about as a
//! closed [`Node`] enum, in pre-order, to a caller-supplied closure. Detectors
//! `match` on the variant they need and ignore the rest, so the traversal logic
//! lives in one place.

use sqlparser::ast::*;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Nesting beyond this many queries/expressions is not inspected.
pub(crate) const MAX_WALK_DEPTH: usize = 100;

/// AST nodes relevant to detection.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// A WITH clause, yielded before its CTE bodies are walked.
    With(&'a With),
    /// A SELECT block, yielded before its clauses are walked.
    Select(&'a Select),
    /// A table path in a FROM clause or join (`project.dataset.table`).
    TablePath(&'a ObjectName),
    /// A function call, yielded before its arguments are walked.
    Function(&'a Function),
    /// The root expression of a WHERE clause.
    Predicate(&'a Expr),
}

/// Returns the query a statement carries, if any.
///
/// `UPDATE`, `DELETE` and `MERGE` carry clauses rather than a query; see
/// [`walk_statement`].
pub fn statement_query(stmt: &Statement) -> Option<&Query> {
    match stmt {
        Statement::Query(query) => Some(query.as_ref()),
        Statement::Insert(insert) => insert.source.as_deref(),
        Statement::CreateView { query, .. } => Some(query.as_ref()),
        Statement::CreateTable(create) => create.query.as_deref(),
        _ => None,
    }
}

/// Walks every relevant node of a statement.
///
/// Statements with neither a query nor DML clauses (DDL, `SET`, ...) yield
/// nothing.
pub fn walk_statement<'a, F: FnMut(Node<'a>)>(stmt: &'a Statement, visitor: &mut F) {
    let depth = 1;
    match stmt {
        Statement::Update {
            table,
            assignments,
            from,
            selection,
            ..
        } => {
            walk_table_with_joins(table, visitor, depth);
            for assignment in assignments {
                walk_expr(&assignment.value, visitor, depth);
            }
            if let Some(
                UpdateTableFromKind::BeforeSet(tables) | UpdateTableFromKind::AfterSet(tables),
            ) = from
            {
                for table in tables {
                    walk_table_with_joins(table, visitor, depth);
                }
            }
            walk_where(selection.as_ref(), visitor, depth);
        }
        Statement::Delete(delete) => {
            match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                    for table in tables {
                        walk_table_with_joins(table, visitor, depth);
                    }
                }
            }
            for table in delete.using.iter().flatten() {
                walk_table_with_joins(table, visitor, depth);
            }
            walk_where(delete.selection.as_ref(), visitor, depth);
        }
        Statement::Merge {
            table,
            source,
            on,
            clauses,
            ..
        } => {
            walk_table_factor(table, visitor, depth);
            walk_table_factor(source, visitor, depth);
            walk_expr(on, visitor, depth);
            for clause in clauses {
                if let Some(predicate) = &clause.predicate {
                    walk_expr(predicate, visitor, depth);
                }
                match &clause.action {
                    MergeAction::Update { assignments } => {
                        for assignment in assignments {
                            walk_expr(&assignment.value, visitor, depth);
                        }
                    }
                    MergeAction::Insert(insert) => {
                        if let MergeInsertKind::Values(values) = &insert.kind {
                            for expr in values.rows.iter().flatten() {
                                walk_expr(expr, visitor, depth);
                            }
                        }
                    }
                    MergeAction::Delete => {}
                }
            }
        }
        _ => {
            if let Some(query) = statement_query(stmt) {
                walk_query(query, visitor, 0);
            }
        }
    }
}

/// Walks a query, its WITH clause included.
pub fn walk_query<'a, F: FnMut(Node<'a>)>(query: &'a Query, visitor: &mut F, depth: usize) {
    if exceeds_depth(depth) {
        return;
    }
    if let Some(with) = &query.with {
        visitor(Node::With(with));
        for cte in &with.cte_tables {
            walk_query(&cte.query, visitor, depth + 1);
        }
    }
    walk_query_body(query, visitor, depth);
}

/// Walks a query without its WITH clause: the body and ORDER BY.
pub fn walk_query_body<'a, F: FnMut(Node<'a>)>(query: &'a Query, visitor: &mut F, depth: usize) {
    walk_set_expr(&query.body, visitor, depth + 1);

    if let Some(order_by) = &query.order_by {
        if let OrderByKind::Expressions(exprs) = &order_by.kind {
            for order_expr in exprs {
                walk_expr(&order_expr.expr, visitor, depth + 1);
            }
        }
    }
}

fn walk_set_expr<'a, F: FnMut(Node<'a>)>(body: &'a SetExpr, visitor: &mut F, depth: usize) {
    if exceeds_depth(depth) {
        return;
    }
    match body {
        SetExpr::Select(select) => walk_select(select, visitor, depth),
        SetExpr::Query(query) => walk_query(query, visitor, depth + 1),
        SetExpr::SetOperation { left, right, .. } => {
            walk_set_expr(left, visitor, depth + 1);
            walk_set_expr(right, visitor, depth + 1);
        }
        SetExpr::Values(values) => {
            for row in &values.rows {
                for expr in row {
                    walk_expr(expr, visitor, depth + 1);
                }
            }
        }
        _ => {}
    }
}

fn walk_select<'a, F: FnMut(Node<'a>)>(select: &'a Select, visitor: &mut F, depth: usize) {
    visitor(Node::Select(select));
    let depth = depth + 1;

    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                walk_expr(expr, visitor, depth)
            }
            SelectItem::Wildcard(options) | SelectItem::QualifiedWildcard(_, options) => {
                // SELECT * REPLACE (expr AS col)
                for element in options.opt_replace.iter().flat_map(|r| &r.items) {
                    walk_expr(&element.expr, visitor, depth);
                }
            }
        }
    }

    for table in &select.from {
        walk_table_with_joins(table, visitor, depth);
    }

    walk_where(select.selection.as_ref(), visitor, depth);

    if let GroupByExpr::Expressions(exprs, _) = &select.group_by {
        for expr in exprs {
            walk_expr(expr, visitor, depth);
        }
    }
    if let Some(having) = &select.having {
        walk_expr(having, visitor, depth);
    }
    if let Some(qualify) = &select.qualify {
        walk_expr(qualify, visitor, depth);
    }
}

fn walk_where<'a, F: FnMut(Node<'a>)>(
    selection: Option<&'a Expr>,
    visitor: &mut F,
    depth: usize,
) {
    if let Some(selection) = selection {
        visitor(Node::Predicate(selection));
        walk_expr(selection, visitor, depth);
    }
}

fn walk_table_with_joins<'a, F: FnMut(Node<'a>)>(
    table: &'a TableWithJoins,
    visitor: &mut F,
    depth: usize,
) {
    walk_table_factor(&table.relation, visitor, depth);
    for join in &table.joins {
        walk_table_factor(&join.relation, visitor, depth);
        if let Some(JoinConstraint::On(expr)) = join_constraint(&join.join_operator) {
            walk_expr(expr, visitor, depth);
        }
    }
}

fn walk_table_factor<'a, F: FnMut(Node<'a>)>(
    factor: &'a TableFactor,
    visitor: &mut F,
    depth: usize,
) {
    if exceeds_depth(depth) {
        return;
    }
    match factor {
        TableFactor::Table { name, .. } => visitor(Node::TablePath(name)),
        TableFactor::Derived { subquery, .. } => walk_query(subquery, visitor, depth + 1),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => walk_table_with_joins(table_with_joins, visitor, depth + 1),
        TableFactor::UNNEST { array_exprs, .. } => {
            for expr in array_exprs {
                walk_expr(expr, visitor, depth + 1);
            }
        }
        TableFactor::TableFunction { expr, .. } => walk_expr(expr, visitor, depth + 1),
        TableFactor::Pivot { table, .. }
        | TableFactor::Unpivot { table, .. }
        | TableFactor::MatchRecognize { table, .. } => {
            walk_table_factor(table, visitor, depth + 1)
        }
        _ => {}
    }
}

fn join_constraint(op: &JoinOperator) -> Option<&JoinConstraint> {
    match op {
        JoinOperator::Join(c)
        | JoinOperator::Inner(c)
        | JoinOperator::Left(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::Right(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c)
        | JoinOperator::CrossJoin(c)
        | JoinOperator::Semi(c)
        | JoinOperator::LeftSemi(c)
        | JoinOperator::RightSemi(c)
        | JoinOperator::Anti(c)
        | JoinOperator::LeftAnti(c)
        | JoinOperator::RightAnti(c)
        | JoinOperator::StraightJoin(c) => Some(c),
        JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

fn walk_expr<'a, F: FnMut(Node<'a>)>(expr: &'a Expr, visitor: &mut F, depth: usize) {
    if exceeds_depth(depth) {
        return;
    }
    let depth = depth + 1;

    match expr {
        Expr::Function(func) => {
            visitor(Node::Function(func));
            walk_function_args(func, visitor, depth);
        }

        Expr::UnaryOp { expr: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::Nested(inner)
        | Expr::Extract { expr: inner, .. }
        | Expr::Ceil { expr: inner, .. }
        | Expr::Floor { expr: inner, .. }
        | Expr::IsNull(inner)
        | Expr::IsNotNull(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner)
        | Expr::Collate { expr: inner, .. }
        | Expr::Named { expr: inner, .. }
        | Expr::Prefixed { value: inner, .. }
        | Expr::OuterJoin(inner)
        | Expr::Prior(inner)
        | Expr::JsonAccess { value: inner, .. } => walk_expr(inner, visitor, depth),
        Expr::Interval(interval) => walk_expr(&interval.value, visitor, depth),
        Expr::Lambda(lambda) => walk_expr(&lambda.body, visitor, depth),

        Expr::BinaryOp { left, right, .. }
        | Expr::AnyOp { left, right, .. }
        | Expr::AllOp { left, right, .. }
        | Expr::IsDistinctFrom(left, right)
        | Expr::IsNotDistinctFrom(left, right) => {
            walk_expr(left, visitor, depth);
            walk_expr(right, visitor, depth);
        }

        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. }
        | Expr::RLike { expr, pattern, .. } => {
            walk_expr(expr, visitor, depth);
            walk_expr(pattern, visitor, depth);
        }

        Expr::Position { expr, r#in } => {
            walk_expr(expr, visitor, depth);
            walk_expr(r#in, visitor, depth);
        }
        Expr::AtTimeZone {
            timestamp,
            time_zone,
        } => {
            walk_expr(timestamp, visitor, depth);
            walk_expr(time_zone, visitor, depth);
        }
        Expr::InUnnest {
            expr, array_expr, ..
        } => {
            walk_expr(expr, visitor, depth);
            walk_expr(array_expr, visitor, depth);
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            walk_expr(expr, visitor, depth);
            walk_expr(low, visitor, depth);
            walk_expr(high, visitor, depth);
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            walk_expr(expr, visitor, depth);
            if let Some(from) = substring_from {
                walk_expr(from, visitor, depth);
            }
            if let Some(for_expr) = substring_for {
                walk_expr(for_expr, visitor, depth);
            }
        }
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(op) = operand {
                walk_expr(op, visitor, depth);
            }
            for case_when in conditions {
                walk_expr(&case_when.condition, visitor, depth);
                walk_expr(&case_when.result, visitor, depth);
            }
            if let Some(el) = else_result {
                walk_expr(el, visitor, depth);
            }
        }

        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => {
            walk_expr(expr, visitor, depth);
            if let Some(what) = trim_what {
                walk_expr(what, visitor, depth);
            }
            for e in trim_characters.iter().flatten() {
                walk_expr(e, visitor, depth);
            }
        }
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            walk_expr(expr, visitor, depth);
            walk_expr(overlay_what, visitor, depth);
            walk_expr(overlay_from, visitor, depth);
            if let Some(for_expr) = overlay_for {
                walk_expr(for_expr, visitor, depth);
            }
        }
        Expr::Convert { expr, styles, .. } => {
            walk_expr(expr, visitor, depth);
            for e in styles {
                walk_expr(e, visitor, depth);
            }
        }
        Expr::CompoundFieldAccess { root, access_chain } => {
            walk_expr(root, visitor, depth);
            for access in access_chain {
                match access {
                    AccessExpr::Dot(e) => walk_expr(e, visitor, depth),
                    AccessExpr::Subscript(Subscript::Index { index }) => {
                        walk_expr(index, visitor, depth)
                    }
                    AccessExpr::Subscript(Subscript::Slice {
                        lower_bound,
                        upper_bound,
                        stride,
                    }) => {
                        for e in [lower_bound, upper_bound, stride].into_iter().flatten() {
                            walk_expr(e, visitor, depth);
                        }
                    }
                }
            }
        }
        Expr::Map(map) => {
            for entry in &map.entries {
                walk_expr(&entry.key, visitor, depth);
                walk_expr(&entry.value, visitor, depth);
            }
        }

        Expr::Tuple(exprs) | Expr::Struct { values: exprs, .. } => {
            for e in exprs {
                walk_expr(e, visitor, depth);
            }
        }
        Expr::GroupingSets(sets) | Expr::Cube(sets) | Expr::Rollup(sets) => {
            for e in sets.iter().flatten() {
                walk_expr(e, visitor, depth);
            }
        }
        Expr::Array(array) => {
            for e in &array.elem {
                walk_expr(e, visitor, depth);
            }
        }
        Expr::InList { expr, list, .. } => {
            walk_expr(expr, visitor, depth);
            for e in list {
                walk_expr(e, visitor, depth);
            }
        }

        Expr::InSubquery {
            expr: inner,
            subquery,
            ..
        } => {
            walk_expr(inner, visitor, depth);
            walk_query(subquery, visitor, depth);
        }
        Expr::Subquery(subquery) | Expr::Exists { subquery, .. } => {
            walk_query(subquery, visitor, depth)
        }

        _ => {}
    }
}

/// Walks arguments, argument clauses (`ORDER BY`/`LIMIT` inside the call),
/// `FILTER`, `WITHIN GROUP` and the `OVER` window.
fn walk_function_args<'a, F: FnMut(Node<'a>)>(func: &'a Function, visitor: &mut F, depth: usize) {
    walk_arguments(&func.parameters, visitor, depth);
    walk_arguments(&func.args, visitor, depth);
    if let Some(filter) = &func.filter {
        walk_expr(filter, visitor, depth);
    }
    for order_expr in &func.within_group {
        walk_expr(&order_expr.expr, visitor, depth);
    }
    if let Some(WindowType::WindowSpec(spec)) = &func.over {
        for expr in &spec.partition_by {
            walk_expr(expr, visitor, depth);
        }
        for order_expr in &spec.order_by {
            walk_expr(&order_expr.expr, visitor, depth);
        }
    }
}

fn walk_arguments<'a, F: FnMut(Node<'a>)>(
    arguments: &'a FunctionArguments,
    visitor: &mut F,
    depth: usize,
) {
    match arguments {
        FunctionArguments::List(arg_list) => {
            for arg in &arg_list.args {
                match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
                    | FunctionArg::Named {
                        arg: FunctionArgExpr::Expr(expr),
                        ..
                    } => walk_expr(expr, visitor, depth),
                    FunctionArg::ExprNamed { name, arg, .. } => {
                        walk_expr(name, visitor, depth);
                        if let FunctionArgExpr::Expr(expr) = arg {
                            walk_expr(expr, visitor, depth);
                        }
                    }
                    _ => {}
                }
            }
            for clause in &arg_list.clauses {
                match clause {
                    FunctionArgumentClause::OrderBy(order_exprs) => {
                        for order_expr in order_exprs {
                            walk_expr(&order_expr.expr, visitor, depth);
                        }
                    }
                    FunctionArgumentClause::Limit(expr) => walk_expr(expr, visitor, depth),
                    _ => {}
                }
            }
        }
        FunctionArguments::Subquery(query) => walk_query(query, visitor, depth),
        FunctionArguments::None => {}
    }
}

fn exceeds_depth(depth: usize) -> bool {
    if depth > MAX_WALK_DEPTH {
        #[cfg(feature = "tracing")]
        debug!(depth, "max walk depth exceeded, skipping subtree");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sql;

    fn collect(sql: &str) -> Vec<String> {
        let stmts = parse_sql(sql).unwrap();
        let mut seen = Vec::new();
        for stmt in &stmts {
            walk_statement(stmt, &mut |node| {
                let label = match node {
                    Node::With(with) => format!("with:{}", with.cte_tables.len()),
                    Node::Select(_) => "select".to_string(),
                    Node::TablePath(name) => format!("table:{name}"),
                    Node::Function(func) => format!("fn:{}", func.name),
                    Node::Predicate(_) => "where".to_string(),
                };
                seen.push(label);
            });
        }
        seen
    }

    #[test]
    fn test_pre_order_for_simple_select() {
        let seen = collect("SELECT UPPER(a) FROM t WHERE b = 1");
        assert_eq!(seen, vec!["select", "fn:UPPER", "table:t", "where"]);
    }

    #[test]
    fn test_with_clause_precedes_cte_bodies() {
        let seen = collect("WITH x AS (SELECT * FROM t) SELECT * FROM x");
        assert_eq!(
            seen,
            vec!["with:1", "select", "table:t", "select", "table:x"]
        );
    }

    #[test]
    fn test_nested_functions_and_subqueries() {
        let seen = collect(
            "SELECT a FROM t WHERE LOWER(b) IN (SELECT c FROM u WHERE ABS(d) > 1)",
        );
        assert_eq!(
            seen,
            vec![
                "select",
                "table:t",
                "where",
                "fn:LOWER",
                "select",
                "table:u",
                "where",
                "fn:ABS",
            ]
        );
    }

    #[test]
    fn test_joins_and_derived_tables() {
        let seen = collect(
            "SELECT * FROM a JOIN (SELECT * FROM b) d ON COALESCE(a.x, 0) = d.x",
        );
        assert_eq!(
            seen,
            vec!["select", "table:a", "select", "table:b", "fn:COALESCE"]
        );
    }

    #[test]
    fn test_statement_without_query_yields_nothing() {
        assert!(collect("CREATE TABLE t (a INT64)").is_empty());
    }

    #[test]
    fn test_delete_where_is_a_predicate() {
        let seen = collect("DELETE FROM t WHERE LOWER(a) = 'x'");
        assert_eq!(seen, vec!["table:t", "where", "fn:LOWER"]);
    }

    #[test]
    fn test_update_assignments_then_where() {
        let seen = collect("UPDATE t SET a = UPPER(b) WHERE c IN (SELECT c FROM u)");
        assert_eq!(
            seen,
            vec!["table:t", "fn:UPPER", "where", "select", "table:u"]
        );
    }

    #[test]
    fn test_merge_source_and_clauses() {
        let seen = collect(
            "MERGE INTO t USING (SELECT * FROM u) s ON t.id = s.id \
             WHEN MATCHED AND LOWER(s.b) = 'x' THEN UPDATE SET b = UPPER(s.b)",
        );
        assert_eq!(
            seen,
            vec!["table:t", "select", "table:u", "fn:LOWER", "fn:UPPER"]
        );
    }

    #[test]
    fn test_window_and_argument_clauses() {
        let seen = collect(
            "SELECT ARRAY_AGG(a ORDER BY ABS(b)) OVER (PARTITION BY LOWER(c)) FROM t",
        );
        assert_eq!(seen, vec!["select", "fn:ARRAY_AGG", "fn:ABS", "fn:LOWER", "table:t"]);
    }

    #[test]
    fn test_insert_source_is_walked() {
        let seen = collect("INSERT INTO t SELECT * FROM u");
        assert_eq!(seen, vec!["select", "table:u"]);
    }
}
