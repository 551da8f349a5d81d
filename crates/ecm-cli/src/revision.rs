//! # Revision Subcommand
//!
//! Compares a candidate revision of a published record against the
//! published one. The candidate must keep `_added_by` and every existing
//! `_updated_by` entry, and any change to the record body must come with a
//! newly appended `_updated_by` entry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ecm_schema::check_revision;

/// Arguments for the `ecm revision` subcommand.
#[derive(Args, Debug)]
pub struct RevisionArgs {
    /// The published record.
    #[arg(value_name = "PREVIOUS")]
    pub previous: PathBuf,

    /// The candidate revision.
    #[arg(value_name = "CURRENT")]
    pub current: PathBuf,
}

/// Execute the revision subcommand.
///
/// Returns exit code: 0 if the revision keeps the provenance contract,
/// 1 otherwise.
pub fn run_revision(args: &RevisionArgs) -> Result<u8> {
    let previous = crate::load_measure(&args.previous)?;
    let current = crate::load_measure(&args.current)?;

    let report = check_revision(&previous, &current).context("failed to compare revisions")?;

    if report.is_valid() {
        println!(
            "OK:   {} -> {}",
            args.previous.display(),
            args.current.display()
        );
        Ok(0)
    } else {
        println!(
            "FAIL: {} -> {}",
            args.previous.display(),
            args.current.display()
        );
        println!("{report}");
        Ok(1)
    }
}
