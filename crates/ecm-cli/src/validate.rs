//! # Validate Subcommand
//!
//! Validates measure record files, or every `*.json` record in a directory,
//! and reports each violation with its location.
//!
//! A record that fails validation is never an error: it is reported and the
//! run continues with the next record. Only an unreadable path aborts the run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use ecm_schema::{BatchReport, MeasureValidator, ValidatorConfig};

/// Report format.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per record, followed by its violations.
    #[default]
    Text,
    /// The full batch report as a JSON document.
    Json,
}

/// Arguments for the `ecm validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record files or directories of records.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Directory holding the time-series files records reference.
    /// Overrides `tsv_dir` from the config file.
    #[arg(long)]
    pub tsv_dir: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every record passes, 1 when any record has a
/// violation or no path was given.
pub fn run_validate(args: &ValidateArgs, config: &ValidatorConfig) -> Result<u8> {
    if args.paths.is_empty() {
        println!("Usage: ecm validate [--tsv-dir DIR] [--format text|json] PATH...");
        return Ok(1);
    }

    let mut config = config.clone();
    if let Some(dir) = &args.tsv_dir {
        config = config.with_tsv_dir(dir);
    }
    let validator = MeasureValidator::new(config).context("failed to compile measure schema")?;

    let batch = validate_paths(&validator, &args.paths)?;

    match args.format {
        OutputFormat::Text => print_text(&batch),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&batch).context("failed to serialize report")?
        ),
    }

    Ok(if batch.is_valid() { 0 } else { 1 })
}

/// Validate each path in order, expanding directories, into one batch.
fn validate_paths(validator: &MeasureValidator, paths: &[PathBuf]) -> Result<BatchReport> {
    let mut batch = BatchReport::default();
    for path in paths {
        if path.is_dir() {
            let dir = validator
                .validate_dir(path)
                .with_context(|| format!("failed to validate {}", path.display()))?;
            for file in dir.files {
                batch.record(file.path, file.report);
            }
        } else {
            let report = validator
                .validate_file(path)
                .with_context(|| format!("failed to validate {}", path.display()))?;
            batch.record(path.clone(), report);
        }
    }
    Ok(batch)
}

fn print_text(batch: &BatchReport) {
    for file in &batch.files {
        if file.report.is_valid() {
            println!("OK:   {}", file.path.display());
        } else {
            println!("FAIL: {}", file.path.display());
            println!("{}", file.report);
        }
    }
    println!("Measures: {}/{} passed", batch.passed, batch.total);
}
