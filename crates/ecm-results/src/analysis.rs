//! # Results Analysis
//!
//! The results document is an object keyed by measure name. Each measure
//! carries an overall section and a by-category section per adoption
//! scenario:
//!
//! ```text
//! <measure>
//!   Markets and Savings (Overall)
//!     <scenario>
//!       Measure Stock (Competed)(units equipment)   { "<year>": n, ... }
//!       Baseline Stock (Uncompeted)(units equipment) { "<year>": n, ... }
//!   Markets and Savings (by Category)
//!     <scenario>
//!       Measure Stock (units equipment)
//!         <state> / <building type> / Heating (Equip.) / <fuel> { "<year>": n }
//! ```
//!
//! The `On-site Generation` entry is not a measure and is skipped.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ResultsError;
use crate::table::YearTable;

/// Adoption scenario analyzed by default.
pub const DEFAULT_SCENARIO: &str = "Max adoption potential";

/// Years analyzed by default; the base year is excluded.
pub const DEFAULT_YEARS: RangeInclusive<i32> = 2025..=2050;

/// Residential building types summed for state totals.
pub const RESIDENTIAL_BUILDING_TYPES: &[&str] = &[
    "Single Family Homes (New)",
    "Multi Family Homes (New)",
    "Manufactured Homes (New)",
    "Single Family Homes (Existing)",
    "Multi Family Homes (Existing)",
    "Manufactured Homes (Existing)",
];

const NON_MEASURE_ENTRY: &str = "On-site Generation";
const OVERALL: &str = "Markets and Savings (Overall)";
const BY_CATEGORY: &str = "Markets and Savings (by Category)";
const MEASURE_STOCK_COMPETED: &str = "Measure Stock (Competed)(units equipment)";
const BASELINE_STOCK_UNCOMPETED: &str = "Baseline Stock (Uncompeted)(units equipment)";
const MEASURE_STOCK: &str = "Measure Stock (units equipment)";
const HEATING_EQUIPMENT: &str = "Heating (Equip.)";

/// Heating fuel branch used when reading state stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatingFuel {
    NaturalGas,
    Electric,
}

impl HeatingFuel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NaturalGas => "Natural Gas",
            Self::Electric => "Electric",
        }
    }

    /// Reference-case gas measures are counted on the gas branch; every
    /// other measure is an electric heating measure.
    pub fn for_measure(measure: &str) -> Self {
        if measure.contains("Ref. Case NG") {
            Self::NaturalGas
        } else {
            Self::Electric
        }
    }
}

/// A parsed results document.
#[derive(Debug, Clone)]
pub struct ResultsFile {
    measures: Map<String, Value>,
}

impl ResultsFile {
    pub fn from_path(path: &Path) -> Result<Self, ResultsError> {
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded results document");
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ResultsError> {
        match value {
            Value::Object(mut measures) => {
                measures.remove(NON_MEASURE_ENTRY);
                Ok(Self { measures })
            }
            _ => Err(ResultsError::NotAnObject {
                path: "(root)".to_string(),
            }),
        }
    }

    /// Measure names, sorted.
    pub fn measures(&self) -> Vec<&str> {
        self.measures.keys().map(String::as_str).collect()
    }

    /// Competed measure stock per measure and year.
    pub fn national_stock(
        &self,
        scenario: &str,
        years: &RangeInclusive<i32>,
    ) -> Result<YearTable, ResultsError> {
        let mut table = YearTable::new(self.columns());
        for (measure, root) in &self.measures {
            let path = [measure.as_str(), OVERALL, scenario, MEASURE_STOCK_COMPETED];
            let series = lookup(root, &path)?;
            for year in years.clone() {
                table.insert(year, measure, year_value(series, year, &path)?);
            }
        }
        Ok(table)
    }

    /// Measure stock as a percentage of uncompeted baseline stock.
    ///
    /// Years with zero baseline stock have no value.
    pub fn national_penetration(
        &self,
        scenario: &str,
        years: &RangeInclusive<i32>,
    ) -> Result<YearTable, ResultsError> {
        let mut table = YearTable::new(self.columns());
        for (measure, root) in &self.measures {
            let stock_path = [measure.as_str(), OVERALL, scenario, MEASURE_STOCK_COMPETED];
            let base_path = [measure.as_str(), OVERALL, scenario, BASELINE_STOCK_UNCOMPETED];
            let stock = lookup(root, &stock_path)?;
            let baseline = lookup(root, &base_path)?;
            for year in years.clone() {
                let s = year_value(stock, year, &stock_path)?;
                let b = year_value(baseline, year, &base_path)?;
                if b != 0.0 {
                    table.insert(year, measure, s * 100.0 / b);
                }
            }
        }
        Ok(table)
    }

    /// Measure stock per state, measure, and year, summed over
    /// `building_types` on the heating fuel branch `fuel_for` selects.
    ///
    /// States are taken from the first measure's by-category section.
    pub fn state_stock(
        &self,
        scenario: &str,
        years: &RangeInclusive<i32>,
        building_types: &[&str],
        fuel_for: impl Fn(&str) -> HeatingFuel,
    ) -> Result<BTreeMap<String, YearTable>, ResultsError> {
        let Some((first, first_root)) = self.measures.iter().next() else {
            return Ok(BTreeMap::new());
        };
        let states_path = [first.as_str(), BY_CATEGORY, scenario, MEASURE_STOCK];
        let states: Vec<String> = as_object(lookup(first_root, &states_path)?, &states_path)?
            .keys()
            .cloned()
            .collect();

        let mut out = BTreeMap::new();
        for state in states {
            let mut table = YearTable::new(self.columns());
            for (measure, root) in &self.measures {
                let fuel = fuel_for(measure);
                let mut totals: BTreeMap<i32, f64> = years.clone().map(|y| (y, 0.0)).collect();
                for bldg in building_types {
                    let path = [
                        measure.as_str(),
                        BY_CATEGORY,
                        scenario,
                        MEASURE_STOCK,
                        state.as_str(),
                        *bldg,
                        HEATING_EQUIPMENT,
                        fuel.as_str(),
                    ];
                    let series = lookup(root, &path)?;
                    for (year, total) in totals.iter_mut() {
                        *total += year_value(series, *year, &path)?;
                    }
                }
                for (year, total) in totals {
                    table.insert(year, measure, total);
                }
            }
            out.insert(state, table);
        }

        tracing::info!(states = out.len(), "computed state measure stock");
        Ok(out)
    }

    fn columns(&self) -> Vec<String> {
        self.measures.keys().cloned().collect()
    }
}

/// Each column's share of the row total, per year, as a fraction.
///
/// Years whose total is zero have no values.
pub fn measure_shares(table: &YearTable) -> YearTable {
    let mut shares = YearTable::new(table.columns().to_vec());
    for year in table.years() {
        let total = table.row_total(year);
        if total == 0.0 {
            continue;
        }
        for column in table.columns() {
            if let Some(v) = table.get(year, column) {
                shares.insert(year, column, v / total);
            }
        }
    }
    shares
}

/// One measure's value in one year across a set of per-state tables.
pub fn year_slice(
    tables: &BTreeMap<String, YearTable>,
    year: i32,
    measure: &str,
) -> BTreeMap<String, f64> {
    tables
        .iter()
        .filter_map(|(state, t)| t.get(year, measure).map(|v| (state.clone(), v)))
        .collect()
}

/// Walk `path[1..]` from `root`; `path[0]` names the measure `root` belongs to.
fn lookup<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value, ResultsError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate().skip(1) {
        current = current
            .get(*key)
            .ok_or_else(|| ResultsError::MissingPath {
                path: path[..=depth].join(" / "),
            })?;
    }
    Ok(current)
}

fn as_object<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Map<String, Value>, ResultsError> {
    value.as_object().ok_or_else(|| ResultsError::NotAnObject {
        path: path.join(" / "),
    })
}

fn year_value(series: &Value, year: i32, path: &[&str]) -> Result<f64, ResultsError> {
    let key = year.to_string();
    let full = || format!("{} / {key}", path.join(" / "));
    series
        .get(&key)
        .ok_or_else(|| ResultsError::MissingPath { path: full() })?
        .as_f64()
        .ok_or_else(|| ResultsError::NotANumber { path: full() })
}
