//! # State Summary
//!
//! A single-year cross-section of one measure across states: its stock in
//! each state and its share of all measure stock in that state.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::ResultsError;
use crate::table::{format_cell, YearTable};

const HEADER: [&str; 3] = ["State", "Measure Stock", "Share (%)"];

/// One row of the state summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateShare {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Measure Stock")]
    pub stock: f64,
    /// Percent of the state's combined stock; absent when that is zero.
    #[serde(rename = "Share (%)")]
    pub share_percent: Option<f64>,
}

/// Summarize `measure` in `year` across per-state tables, in state order.
///
/// States without a value for the measure in that year are left out.
pub fn state_summary(
    tables: &BTreeMap<String, YearTable>,
    year: i32,
    measure: &str,
) -> Vec<StateShare> {
    tables
        .iter()
        .filter_map(|(state, table)| {
            let stock = table.get(year, measure)?;
            let total = table.row_total(year);
            Some(StateShare {
                state: state.clone(),
                stock,
                share_percent: (total != 0.0).then(|| stock * 100.0 / total),
            })
        })
        .collect()
}

/// Write summary rows as CSV with a header row.
pub fn write_state_summary<W: Write>(rows: &[StateShare], writer: W) -> Result<(), ResultsError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;
    for row in rows {
        out.write_record([
            row.state.clone(),
            format_cell(Some(row.stock)),
            format_cell(row.share_percent),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write summary rows as CSV to a file, creating parent directories.
pub fn write_state_summary_path(rows: &[StateShare], path: &Path) -> Result<(), ResultsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_state_summary(rows, std::fs::File::create(path)?)?;
    tracing::debug!(path = %path.display(), states = rows.len(), "wrote state summary");
    Ok(())
}
