//! # ecm-cli — CLI Tool for Measure Records
//!
//! Provides the `ecm` command-line interface.
//!
//! ## Subcommands
//!
//! - `ecm validate`: Validate measure records and report every violation.
//! - `ecm digest`: Content digests of a record and of its immutable body.
//! - `ecm revision`: Check that a new revision only appended provenance.
//! - `ecm results`: Stock, penetration, and share tables from adoption results.
//!
//! ```bash
//! ecm validate measures/
//! ecm validate measures/residential_best_hpwh_dr.json --tsv-dir data/tsv
//! ecm revision published.json candidate.json
//! ecm results ecm_results.json --out tables/
//! ```
//!
//! Handlers return the process exit code: 0 on success, 1 when a record
//! has violations. Operational errors propagate as `anyhow::Error` and exit
//! with 2.

pub mod digest;
pub mod results;
pub mod revision;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use ecm_core::MeasureDescriptor;
use ecm_schema::ValidatorConfig;

/// Load the validator configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}

/// Read and parse a measure record.
pub fn load_measure(path: &Path) -> Result<MeasureDescriptor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    MeasureDescriptor::from_json_str(&content)
        .with_context(|| format!("failed to parse measure record {}", path.display()))
}
