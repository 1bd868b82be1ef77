//! Antipattern CLI - structural SQL antipattern detector

use antipattern_cli::cli::{Args, OutputFormat};
use antipattern_cli::input;
use antipattern_cli::output::{format_json, format_text, FileResult};

use anyhow::{Context, Result};
use antipattern_core::{analyze, AnalyzeRequest, Dialect, DetectorConfig};
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

/// Findings reported or inputs that failed to parse.
const EXIT_FAILURE: u8 = 1;
/// Usage or IO error (unreadable input, unwritable output).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_failures) => {
            if has_failures {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("antipattern: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Analyzes every input and writes the report; returns true when anything was found.
fn run(args: Args) -> Result<bool> {
    let sources = input::read_input(&args.files).context("Failed to collect SQL input")?;
    let dialect: Dialect = args.dialect.into();
    let config = DetectorConfig {
        enabled: true,
        disabled_detectors: args.exclude_detectors.clone(),
    };

    let results: Vec<FileResult> = sources
        .into_iter()
        .map(|source| {
            let outcome = analyze(&AnalyzeRequest {
                sql: source.content,
                dialect,
                source_name: Some(source.name.clone()),
                config: config.clone(),
            })
            .map_err(|err| err.to_string());

            if let Err(message) = &outcome {
                if !args.quiet {
                    eprintln!("antipattern: warning: {}: {message}", source.name);
                }
            }

            FileResult {
                name: source.name,
                outcome,
            }
        })
        .collect();

    let has_failures = results.iter().any(|r| !r.is_clean());

    let content = match args.format {
        OutputFormat::Text => {
            let colored = args.output.is_none() && io::stdout().is_terminal();
            format_text(&results, colored)
        }
        OutputFormat::Json => format_json(&results, args.compact),
    };
    write_output(&args.output, &content)?;

    Ok(has_failures)
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
