//! JSON output formatting.

use super::FileResult;
use serde_json::{json, Value};

/// Format results as a JSON array of `{ name, report }` / `{ name, error }`.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(results: &[FileResult], compact: bool) -> String {
    let values: Vec<Value> = results
        .iter()
        .map(|file| match &file.outcome {
            Ok(report) => json!({ "name": file.name, "report": report }),
            Err(message) => json!({ "name": file.name, "error": message }),
        })
        .collect();

    let value = Value::Array(values);
    if compact {
        serde_json::to_string(&value).expect("serialization cannot fail")
    } else {
        serde_json::to_string_pretty(&value).expect("serialization cannot fail")
    }
}
