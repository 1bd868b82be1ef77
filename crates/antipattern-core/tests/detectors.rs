//! End-to-end checks of the detector set through the public API.

use antipattern_core::{
    all_detectors, analyze, detector_codes, parse_sql, parse_sql_with_dialect, AnalyzeRequest,
    Dialect,
};
use rstest::rstest;

const CTE_A_TWICE: &str = "CTE with multiple references: alias a is referenced 2 times.";
const REGEXP: &str =
    "REGEXP_CONTAINS : Prefer LIKE when the full power of regex is not needed (e.g. wildcard matching).";
const IN_SUBQUERY: &str = "Subquery in the WHERE clause without aggregation.";

fn messages(sql: &str) -> Vec<(String, String)> {
    let report = analyze(&AnalyzeRequest {
        sql: sql.to_string(),
        ..Default::default()
    })
    .unwrap();
    report
        .statements
        .into_iter()
        .flat_map(|s| s.findings)
        .map(|f| (f.detector, f.message))
        .collect()
}

fn messages_of(sql: &str, code: &str) -> Vec<String> {
    messages(sql)
        .into_iter()
        .filter(|(detector, _)| detector == code)
        .map(|(_, message)| message)
        .collect()
}

#[rstest]
#[case("SELECT * FROM t")]
#[case("SELECT a, COUNT(*) FROM t GROUP BY a")]
#[case("INSERT INTO t SELECT * FROM u JOIN u AS u2 ON u.id = u2.id")]
fn statements_without_with_clause_have_no_cte_findings(#[case] sql: &str) {
    assert!(messages_of(sql, detector_codes::CTE_MULTIPLE_REFERENCES).is_empty());
}

#[test]
fn cte_referenced_by_two_sibling_ctes() {
    let found = messages_of(
        "WITH a AS (SELECT * FROM `project.dataset.table1` t1),
              b AS (SELECT * FROM a t2),
              c AS (SELECT * FROM a t3)
         SELECT b.col1, c.col2 FROM b, c",
        detector_codes::CTE_MULTIPLE_REFERENCES,
    );
    assert_eq!(found, vec![CTE_A_TWICE]);
}

#[test]
fn cte_referenced_in_outer_from_and_join_subquery() {
    let found = messages_of(
        "WITH a AS (SELECT * FROM `project.dataset.table1`)
         SELECT a.col1, total
         FROM a
         LEFT JOIN (SELECT a.col1, SUM(a.col3) total FROM a GROUP BY a.col1) t2
         ON t2.col1 = a.col2",
        detector_codes::CTE_MULTIPLE_REFERENCES,
    );
    assert_eq!(found, vec![CTE_A_TWICE]);
}

#[test]
fn ctes_over_base_tables_only_are_clean() {
    let found = messages_of(
        "WITH b AS (SELECT * FROM `project.dataset.b`),
              c AS (SELECT * FROM `project.dataset.c`)
         SELECT b.dim1, c.dim2 FROM b, c;",
        detector_codes::CTE_MULTIPLE_REFERENCES,
    );
    assert!(found.is_empty(), "unexpected findings: {found:?}");
}

#[rstest]
#[case("DELETE FROM t WHERE REGEXP_CONTAINS(a, 'x') AND id IN (SELECT id FROM u)")]
#[case("UPDATE t SET b = 1 WHERE REGEXP_CONTAINS(a, 'x') AND id IN (SELECT id FROM u)")]
#[case(
    "MERGE INTO t USING (SELECT * FROM u WHERE id IN (SELECT id FROM v)) s ON t.id = s.id \
     WHEN MATCHED THEN UPDATE SET b = REGEXP_CONTAINS(s.a, 'x')"
)]
fn dml_statements_are_inspected(#[case] sql: &str) {
    let mut found: Vec<String> = messages(sql).into_iter().map(|(code, _)| code).collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            detector_codes::IN_SUBQUERY_WITHOUT_AGGREGATION,
            detector_codes::NAIVE_REGEXP_CONTAINS,
        ]
    );
}

#[rstest]
#[case("SELECT * FROM t WHERE REGEXP_CONTAINS(col, 'pattern')", 1)]
#[case(
    "SELECT * FROM t WHERE REGEXP_CONTAINS(col, 'a') OR REGEXP_CONTAINS(col, 'b')",
    2
)]
#[case("SELECT * FROM t WHERE col LIKE 'a%'", 0)]
#[case("SELECT ROW_NUMBER() OVER (PARTITION BY REGEXP_CONTAINS(a, 'x') ORDER BY b) FROM t", 1)]
#[case("SELECT STRUCT(REGEXP_CONTAINS(a, 'x') AS m) FROM t", 1)]
#[case("SELECT arr[OFFSET(REGEXP_CONTAINS(a, 'x'))] FROM t", 1)]
#[case("SELECT ARRAY_AGG(a ORDER BY REGEXP_CONTAINS(a, 'x')) FROM t", 1)]
#[case("SELECT * REPLACE (REGEXP_CONTAINS(a, 'x') AS a) FROM t", 1)]
#[case("SELECT (SELECT AS STRUCT REGEXP_CONTAINS(a, 'x') AS m).m FROM t", 1)]
fn regexp_contains_is_reported_per_call(#[case] sql: &str, #[case] expected: usize) {
    let found = messages_of(sql, detector_codes::NAIVE_REGEXP_CONTAINS);
    assert_eq!(found.len(), expected);
    assert!(found.iter().all(|m| m == REGEXP));
}

#[rstest]
#[case("SELECT * FROM t WHERE col IN (SELECT col FROM u)", true)]
#[case("SELECT * FROM t WHERE col NOT IN (SELECT col FROM u)", true)]
#[case("SELECT * FROM t WHERE col IN (SELECT DISTINCT col FROM u)", false)]
#[case("SELECT * FROM t WHERE col IN (SELECT col FROM u GROUP BY col)", false)]
#[case("SELECT * FROM t WHERE (c1, c2) IN (SELECT (c1, c2) FROM u)", true)]
#[case("SELECT * FROM t WHERE col IN (1, 2, 3, 4)", false)]
#[case("SELECT * FROM t WHERE (col IN (SELECT col FROM u)) IS TRUE", true)]
fn in_subquery_membership(#[case] sql: &str, #[case] flagged: bool) {
    let found = messages_of(sql, detector_codes::IN_SUBQUERY_WITHOUT_AGGREGATION);
    if flagged {
        assert_eq!(found, vec![IN_SUBQUERY]);
    } else {
        assert!(found.is_empty(), "unexpected findings for {sql}: {found:?}");
    }
}

#[rstest]
#[case(Dialect::Generic)]
#[case(Dialect::Bigquery)]
#[case(Dialect::Postgres)]
#[case(Dialect::Snowflake)]
fn detection_does_not_depend_on_dialect(#[case] dialect: Dialect) {
    let sql = "WITH a AS (SELECT * FROM t), b AS (SELECT * FROM a), c AS (SELECT * FROM a) \
               SELECT * FROM b, c WHERE b.x IN (SELECT x FROM u)";
    let report = analyze(&AnalyzeRequest {
        sql: sql.to_string(),
        dialect,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(report.to_text(), format!("{CTE_A_TWICE}\n{IN_SUBQUERY}"));
}

#[test]
fn every_detector_is_idempotent() {
    let sql = "WITH a AS (SELECT * FROM t), b AS (SELECT * FROM a), c AS (SELECT * FROM a), \
               d AS (SELECT * FROM a) \
               SELECT REGEXP_CONTAINS(x, 'y') FROM b, c, d WHERE x IN (SELECT x FROM u)";
    let stmt = parse_sql(sql).unwrap().remove(0);
    for detector in all_detectors() {
        let first = detector.run(&stmt);
        let second = detector.run(&stmt);
        assert_eq!(first, second, "{} is not idempotent", detector.code());
        assert!(!first.is_empty(), "{} found nothing", detector.code());
    }
}

#[test]
fn detectors_can_share_a_statement_across_threads() {
    let stmt = parse_sql_with_dialect(
        "SELECT REGEXP_CONTAINS(a, 'x') FROM t WHERE a IN (SELECT a FROM u)",
        Dialect::Bigquery,
    )
    .unwrap()
    .remove(0);
    let stmt = &stmt;
    let detectors = all_detectors();

    let results: Vec<Vec<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = detectors
            .iter()
            .map(|detector| scope.spawn(move || detector.run(stmt)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let sequential: Vec<Vec<String>> = detectors.iter().map(|d| d.run(stmt)).collect();
    assert_eq!(results, sequential);
}

#[test]
fn detector_metadata_is_populated() {
    for detector in all_detectors() {
        assert!(!detector.code().is_empty());
        assert!(!detector.name().is_empty());
        assert!(!detector.description().is_empty());
    }
}
