//! # Results Subcommand
//!
//! Derives the analysis tables from an adoption results document and writes
//! them as CSV under an output directory:
//!
//! ```text
//! <out>/national_measure_stock.csv
//! <out>/national_stock_penetration.csv
//! <out>/national_measure_share.csv
//! <out>/state_measure_stock/<STATE>.csv
//! <out>/state_summary.csv              (with --focus)
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use ecm_results::{
    measure_shares, state_summary, write_state_summary_path, HeatingFuel, ResultsFile,
    DEFAULT_SCENARIO, DEFAULT_YEARS, RESIDENTIAL_BUILDING_TYPES,
};

/// Arguments for the `ecm results` subcommand.
#[derive(Args, Debug)]
pub struct ResultsArgs {
    /// Results document written by the adoption model.
    #[arg(value_name = "RESULTS_JSON")]
    pub results: PathBuf,

    /// Output directory for the CSV tables.
    #[arg(long)]
    pub out: PathBuf,

    /// Adoption scenario to analyze.
    #[arg(long, default_value = DEFAULT_SCENARIO)]
    pub scenario: String,

    /// First year analyzed.
    #[arg(long, default_value_t = *DEFAULT_YEARS.start())]
    pub from: i32,

    /// Last year analyzed.
    #[arg(long, default_value_t = *DEFAULT_YEARS.end())]
    pub to: i32,

    /// Measure to summarize across states.
    #[arg(long)]
    pub focus: Option<String>,

    /// Year of the state summary.
    #[arg(long, default_value_t = *DEFAULT_YEARS.end())]
    pub summary_year: i32,
}

/// Execute the results subcommand.
pub fn run_results(args: &ResultsArgs) -> Result<u8> {
    if args.from > args.to {
        bail!("empty year range: {}..={}", args.from, args.to);
    }
    let years = args.from..=args.to;

    let results = ResultsFile::from_path(&args.results)
        .with_context(|| format!("failed to load results {}", args.results.display()))?;
    if let Some(focus) = &args.focus {
        if !results.measures().contains(&focus.as_str()) {
            bail!("measure {focus:?} is not in {}", args.results.display());
        }
        if !years.contains(&args.summary_year) {
            bail!("summary year {} is outside {}..={}", args.summary_year, args.from, args.to);
        }
    }

    let stock = results.national_stock(&args.scenario, &years)?;
    stock.write_csv_path(&args.out.join("national_measure_stock.csv"))?;

    let penetration = results.national_penetration(&args.scenario, &years)?;
    penetration.write_csv_path(&args.out.join("national_stock_penetration.csv"))?;

    measure_shares(&stock).write_csv_path(&args.out.join("national_measure_share.csv"))?;

    let states = results.state_stock(
        &args.scenario,
        &years,
        RESIDENTIAL_BUILDING_TYPES,
        HeatingFuel::for_measure,
    )?;
    let state_dir = args.out.join("state_measure_stock");
    for (state, table) in &states {
        table.write_csv_path(&state_dir.join(format!("{state}.csv")))?;
    }

    if let Some(focus) = &args.focus {
        let rows = state_summary(&states, args.summary_year, focus);
        write_state_summary_path(&rows, &args.out.join("state_summary.csv"))?;
    }

    tracing::info!(
        measures = results.measures().len(),
        states = states.len(),
        scenario = %args.scenario,
        "wrote results tables"
    );
    println!(
        "Wrote {} measure(s), {} state(s) to {}",
        results.measures().len(),
        states.len(),
        args.out.display()
    );
    Ok(0)
}
