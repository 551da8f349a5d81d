//! Errors raised while reading or exporting adoption results.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    /// A key path expected in the results document is absent.
    #[error("missing results path: {path}")]
    MissingPath { path: String },

    /// A value expected to be numeric is not.
    #[error("expected a number at {path}")]
    NotANumber { path: String },

    /// A value expected to be an object is not.
    #[error("expected an object at {path}")]
    NotAnObject { path: String },

    /// The results document is not valid JSON.
    #[error("invalid results JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
