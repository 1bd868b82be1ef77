//! Human-readable output.

use super::FileResult;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Format results as one section per input followed by a summary line.
pub fn format_text(results: &[FileResult], colored: bool) -> String {
    let mut out = String::new();

    for file in results {
        write_file_section(&mut out, file, colored);
    }

    let findings: usize = results.iter().map(FileResult::finding_count).sum();
    let errors = results.iter().filter(|r| r.outcome.is_err()).count();
    write!(
        out,
        "{} file{}, {} finding{}",
        results.len(),
        plural(results.len()),
        findings,
        plural(findings)
    )
    .unwrap();
    if errors > 0 {
        write!(out, ", {errors} parse error{}", plural(errors)).unwrap();
    }
    out.push('\n');

    out
}

fn write_file_section(out: &mut String, file: &FileResult, colored: bool) {
    let status = match (&file.outcome, file.is_clean()) {
        (Err(_), _) => paint("ERROR", colored, Color::Red),
        (Ok(_), true) => paint("PASS", colored, Color::Green),
        (Ok(_), false) => paint("FAIL", colored, Color::Red),
    };
    writeln!(out, "== [{}] {}", file.name, status).unwrap();

    match &file.outcome {
        Ok(report) => {
            for statement in &report.statements {
                for finding in &statement.findings {
                    writeln!(
                        out,
                        "S:{:>3} | {} | {}",
                        statement.statement_index,
                        paint(&finding.detector, colored, Color::Yellow),
                        finding.message
                    )
                    .unwrap();
                }
            }
        }
        Err(message) => writeln!(out, "{message}").unwrap(),
    }
}

enum Color {
    Red,
    Green,
    Yellow,
}

fn paint(text: &str, colored: bool, color: Color) -> String {
    if !colored {
        return text.to_string();
    }
    match color {
        Color::Red => text.red().to_string(),
        Color::Green => text.green().to_string(),
        Color::Yellow => text.yellow().to_string(),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
