//! # Digest Subcommand
//!
//! Prints the content digests of a measure record: the digest of the whole
//! record, and the digest of its body (everything except `_updated_by`).
//! The body digest is what must stay fixed between published revisions that
//! only append provenance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ecm_core::ContentDigest;

/// Arguments for the `ecm digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Record file to digest.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Expected body digest (`sha256:<hex>`) of the published record.
    #[arg(long, value_name = "DIGEST")]
    pub expect: Option<ContentDigest>,
}

/// Execute the digest subcommand.
///
/// Returns exit code 1 if `--expect` is given and the body digest differs.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let measure = crate::load_measure(&args.path)?;
    let record = measure.digest().context("failed to digest record")?;
    let body = measure.body_digest().context("failed to digest record body")?;

    tracing::info!(path = %args.path.display(), name = %measure.name, "digested measure record");
    println!("record: {record}");
    println!("body:   {body}");

    match args.expect {
        Some(expected) if expected != body => {
            println!("FAIL: body digest does not match {expected}");
            Ok(1)
        }
        _ => Ok(0),
    }
}
