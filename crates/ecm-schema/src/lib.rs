//! # ecm-schema — Measure Record Validation
//!
//! Validates candidate measure records and reports every violation found.
//! Validation never stops at the first problem and never fails on bad
//! data: malformed input produces a [`ValidationReport`], and only
//! operational problems (an unreadable file, an unloadable config) are
//! returned as errors.
//!
//! ## Two Passes
//!
//! 1. **Structural**: the record is checked against
//!    `schemas/measure.schema.json` (Draft 2020-12) with the `jsonschema`
//!    crate: required fields, JSON types, non-empty strings.
//! 2. **Semantic** ([`rules`]): every quantitative field carries a
//!    citation, costs and lifetimes are positive, market years are plausible
//!    and ordered, categorical values belong to the configured vocabulary,
//!    time-series references resolve, and the provenance trail is well
//!    formed and chronological.
//!
//! Each semantic rule skips a field whose JSON type is wrong, so a single
//! defect is reported once.
//!
//! ## Revisions
//!
//! [`revision::check_revision`] compares two published revisions of the same
//! record and enforces the append-only provenance contract.

pub mod config;
pub mod revision;
pub mod rules;
pub mod validate;

pub use config::{ValidatorConfig, YearRange};
pub use revision::check_revision;
pub use validate::{
    BatchReport, FileReport, MeasureValidator, SchemaValidationError, ValidationReport, Violation,
    ViolationKind, MEASURE_SCHEMA_NAME,
};
