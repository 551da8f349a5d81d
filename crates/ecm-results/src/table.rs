//! # Year Tables
//!
//! A dense-by-convention table keyed by year (rows) and measure (columns).
//! Cells may be absent, e.g. a penetration for a year with no baseline stock.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::error::ResultsError;

/// Values per year and column, with a fixed column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearTable {
    columns: Vec<String>,
    rows: BTreeMap<i32, BTreeMap<String, f64>>,
}

impl YearTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: BTreeMap::new(),
        }
    }

    /// Set a cell; an unknown column is appended to the column order.
    pub fn insert(&mut self, year: i32, column: &str, value: f64) {
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self.rows
            .entry(year)
            .or_default()
            .insert(column.to_string(), value);
    }

    pub fn get(&self, year: i32, column: &str) -> Option<f64> {
        self.rows.get(&year).and_then(|r| r.get(column)).copied()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Years with at least one cell, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.keys().copied()
    }

    /// Sum of all cells in one year.
    pub fn row_total(&self, year: i32) -> f64 {
        self.rows.get(&year).map_or(0.0, |r| r.values().sum())
    }

    /// Write the table as CSV: a `Year` column followed by one column per
    /// measure. Absent cells are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ResultsError> {
        let mut out = csv::Writer::from_writer(writer);

        let mut header = vec!["Year".to_string()];
        header.extend(self.columns.iter().cloned());
        out.write_record(&header)?;

        for (year, row) in &self.rows {
            let mut record = vec![year.to_string()];
            record.extend(
                self.columns
                    .iter()
                    .map(|c| format_cell(row.get(c).copied())),
            );
            out.write_record(&record)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write the table as CSV to a file, creating parent directories.
    pub fn write_csv_path(&self, path: &Path) -> Result<(), ResultsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_csv(file)?;
        tracing::debug!(path = %path.display(), rows = self.rows.len(), "wrote year table");
        Ok(())
    }
}

/// Text of one numeric CSV cell. Every table this crate writes goes through
/// here, so `10.0` is always `10` and an absent value is an empty cell.
pub(crate) fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
