//! Fuzz target for parse + detect.
//!
//! Any input the parser accepts must run through every detector without
//! panicking, and twice in a row with identical output.

#![no_main]

use antipattern_core::{analyze, AnalyzeRequest, Dialect};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
}

impl FuzzInput {
    fn dialect(&self) -> Dialect {
        match self.dialect_idx % 4 {
            0 => Dialect::Bigquery,
            1 => Dialect::Generic,
            2 => Dialect::Postgres,
            _ => Dialect::Snowflake,
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let request = AnalyzeRequest {
        dialect: input.dialect(),
        sql: input.sql,
        ..Default::default()
    };

    if let Ok(first) = analyze(&request) {
        let second = analyze(&request).expect("input parsed once");
        assert_eq!(first, second);
    }
});
