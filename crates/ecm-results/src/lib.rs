//! # ecm-results — Adoption Results Post-Processing
//!
//! Reads the per-measure results document written by the adoption model
//! (`ecm_results.json`) and derives the tables analysts chart:
//!
//! - national measure stock per measure and year,
//! - national stock penetration (measure stock over uncompeted baseline
//!   stock, in percent),
//! - measure shares of the combined stock per year,
//! - state-level measure stock summed over building types,
//! - a single-year cross-section across states, with each state's share.
//!
//! Tables are [`YearTable`]s and export to CSV. Charting is left to
//! whatever consumes the CSV.

pub mod analysis;
pub mod error;
pub mod summary;
pub mod table;

pub use analysis::{
    measure_shares, year_slice, HeatingFuel, ResultsFile, DEFAULT_SCENARIO, DEFAULT_YEARS,
    RESIDENTIAL_BUILDING_TYPES,
};
pub use error::ResultsError;
pub use summary::{state_summary, write_state_summary, write_state_summary_path, StateShare};
pub use table::YearTable;
