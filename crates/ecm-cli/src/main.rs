//! # ecm CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ecm_cli::digest::{run_digest, DigestArgs};
use ecm_cli::results::{run_results, ResultsArgs};
use ecm_cli::revision::{run_revision, RevisionArgs};
use ecm_cli::validate::{run_validate, ValidateArgs};

/// Energy conservation measure toolkit.
///
/// Validates measure records, computes their content digests, checks that
/// revisions keep the append-only provenance trail, and derives stock and
/// penetration tables from adoption results.
#[derive(Parser, Debug)]
#[command(name = "ecm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a validator configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate measure records and report every violation.
    Validate(ValidateArgs),

    /// Print the content digests of a measure record.
    Digest(DigestArgs),

    /// Check a candidate revision against the published record.
    Revision(RevisionArgs),

    /// Write stock, penetration, and share tables from adoption results.
    Results(ResultsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("ecm CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Validate(args) => ecm_cli::load_config(cli.config.as_deref())
            .and_then(|config| run_validate(&args, &config)),
        Commands::Digest(args) => run_digest(&args),
        Commands::Revision(args) => run_revision(&args),
        Commands::Results(args) => run_results(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
