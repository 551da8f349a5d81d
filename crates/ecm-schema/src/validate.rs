//! # Measure Validation
//!
//! Runtime validation of measure records: a structural pass against the
//! bundled JSON Schema, then the semantic rules in [`crate::rules`].
//!
//! ## Reporting Contract
//!
//! Validation of a record always yields a complete [`ValidationReport`].
//! Bad data is never an `Err`: a document that is not even JSON is reported
//! as one `Schema` violation at the root. `Err` is reserved for operational
//! failures such as an unreadable file or directory.
//!
//! ## Schema Resolution
//!
//! The measure schema only uses internal `$defs` references. An offline
//! retriever is installed so that a stray external `$ref` fails the build of
//! the validator instead of issuing a network request.

use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ValidatorConfig;
use crate::rules;

/// Filename of the bundled structural contract.
pub const MEASURE_SCHEMA_NAME: &str = "measure.schema.json";

const MEASURE_SCHEMA: &str = include_str!("../../../schemas/measure.schema.json");

/// Retriever that refuses every external reference.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema references are not supported: {}", uri.as_str()).into())
    }
}

/// Operational failure while validating.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The bundled schema could not be parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// A configuration file could not be loaded.
    #[error("config load error for '{path}': {reason}")]
    ConfigLoadError {
        /// Path to the configuration file.
        path: String,
        /// Reason the configuration could not be loaded.
        reason: String,
    },

    /// A document or directory could not be read.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },
}

/// The rule family that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Missing field, wrong JSON type, or malformed JSON.
    Schema,
    /// A quantitative field without a usable citation.
    Citation,
    /// A value outside its permitted range.
    Range,
    /// Market exit precedes market entry.
    Ordering,
    /// A categorical value outside the configured vocabulary.
    Domain,
    /// A time-series file reference that is malformed or does not resolve.
    Reference,
    /// A malformed or out-of-order provenance entry.
    Provenance,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Citation => "citation",
            Self::Range => "range",
            Self::Ordering => "ordering",
            Self::Domain => "domain",
            Self::Reference => "reference",
            Self::Provenance => "provenance",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// JSON Pointer path to the violating field in the record.
    pub instance_path: String,
    /// JSON Pointer into the schema for structural violations, or
    /// `#rule/<kind>` for semantic ones.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// A violation raised by a semantic rule.
    pub fn rule(kind: ViolationKind, instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            instance_path: instance_path.into(),
            schema_path: format!("#rule/{kind}"),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): [{}] {}", self.kind, self.message)
        } else {
            write!(f, "  {}: [{}] {}", self.instance_path, self.kind, self.message)
        }
    }
}

/// Every violation found in one record, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether the record passed every check.
    pub fn is_valid(&self) -> bool {
        self.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations produced by one rule family.
    pub fn by_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// The report for one file of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: ValidationReport,
}

/// Results of validating every record in a directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn is_valid(&self) -> bool {
        self.failed == 0
    }

    /// Reports for files with at least one violation.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.report.is_valid())
    }

    /// Add one file's report to the batch and update its counts.
    pub fn record(&mut self, path: PathBuf, report: ValidationReport) {
        self.total += 1;
        if report.is_valid() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.files.push(FileReport { path, report });
    }
}

/// Validator for measure records.
///
/// The JSON Schema is compiled once at construction; the validator is
/// immutable afterwards and can be shared across threads.
pub struct MeasureValidator {
    config: ValidatorConfig,
    schema: Validator,
}

impl fmt::Debug for MeasureValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MeasureValidator {
    /// Compile the bundled measure schema and bind it to `config`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` or `ValidatorBuildError` if the bundled
    /// schema is unusable.
    pub fn new(config: ValidatorConfig) -> Result<Self, SchemaValidationError> {
        let schema_value: Value = serde_json::from_str(MEASURE_SCHEMA).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: MEASURE_SCHEMA_NAME.to_string(),
                reason: format!("invalid JSON: {e}"),
            }
        })?;

        let schema = build_options().build(&schema_value).map_err(|e| {
            SchemaValidationError::ValidatorBuildError {
                schema_name: MEASURE_SCHEMA_NAME.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { config, schema })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a decoded record.
    pub fn validate_value(&self, instance: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();

        for e in self.schema.iter_errors(instance) {
            report.push(Violation {
                kind: ViolationKind::Schema,
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            });
        }

        rules::apply_all(instance, &self.config, &mut report);

        tracing::debug!(violations = report.len(), "validated measure record");
        report
    }

    /// Validate a record given as JSON text.
    pub fn validate_str(&self, content: &str) -> ValidationReport {
        match serde_json::from_str::<Value>(content) {
            Ok(instance) => self.validate_value(&instance),
            Err(e) => {
                let mut report = ValidationReport::new();
                report.push(Violation::rule(
                    ViolationKind::Schema,
                    "",
                    format!("invalid JSON: {e}"),
                ));
                report
            }
        }
    }

    /// Validate a record file.
    ///
    /// # Errors
    ///
    /// Returns `DocumentLoadError` only if the file cannot be read.
    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport, SchemaValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchemaValidationError::DocumentLoadError {
                path: path.display().to_string(),
                reason: format!("cannot read file: {e}"),
            }
        })?;
        tracing::debug!(path = %path.display(), "validating measure file");
        Ok(self.validate_str(&content))
    }

    /// Validate every `*.json` file directly inside `dir`, in filename order.
    ///
    /// A file that cannot be read is recorded as a failed entry with a
    /// single root violation; the batch continues.
    ///
    /// # Errors
    ///
    /// Returns `DocumentLoadError` if the directory itself cannot be listed.
    pub fn validate_dir(&self, dir: &Path) -> Result<BatchReport, SchemaValidationError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            SchemaValidationError::DocumentLoadError {
                path: dir.display().to_string(),
                reason: format!("cannot read directory: {e}"),
            }
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut batch = BatchReport::default();
        for path in paths {
            let report = match self.validate_file(&path) {
                Ok(report) => report,
                Err(e) => {
                    let mut report = ValidationReport::new();
                    report.push(Violation::rule(ViolationKind::Schema, "", e.to_string()));
                    report
                }
            };
            batch.record(path, report);
        }

        tracing::info!(
            dir = %dir.display(),
            total = batch.total,
            passed = batch.passed,
            failed = batch.failed,
            "validated measure directory"
        );
        Ok(batch)
    }
}

fn build_options() -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(OfflineRetriever);
    opts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RECORD: &str = include_str!("../../../measures/residential_best_hpwh_dr.json");

    fn validator() -> MeasureValidator {
        MeasureValidator::new(ValidatorConfig::default()).unwrap()
    }

    fn record() -> Value {
        serde_json::from_str(RECORD).unwrap()
    }

    fn remove(v: &mut Value, key: &str) {
        v.as_object_mut().unwrap().remove(key);
    }

    #[test]
    fn test_published_record_has_no_violations() {
        let report = validator().validate_value(&record());
        assert!(report.is_valid(), "unexpected violations:\n{report}");
    }

    #[test]
    fn test_missing_installed_cost_source_is_exactly_one_violation() {
        let mut v = record();
        remove(&mut v, "installed_cost_source");
        assert_eq!(v["installed_cost"], json!(2033));

        let report = validator().validate_value(&v);
        assert_eq!(report.len(), 1, "{report}");
        let only = &report.violations()[0];
        assert_eq!(only.kind, ViolationKind::Citation);
        assert_eq!(only.message, "missing citation for installed_cost");
        assert_eq!(only.instance_path, "/installed_cost_source");
    }

    #[test]
    fn test_null_citation_is_missing() {
        let mut v = record();
        v["product_lifetime_source"] = Value::Null;
        let report = validator().validate_value(&v);
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].message, "missing citation for product_lifetime");
    }

    #[test]
    fn test_missing_required_field_reported_by_schema() {
        let mut v = record();
        remove(&mut v, "measure_type");
        let report = validator().validate_value(&v);
        let schema = report.by_kind(ViolationKind::Schema);
        assert_eq!(schema.len(), 1, "{report}");
        assert!(schema[0].message.contains("measure_type"));
    }

    #[test]
    fn test_collects_all_violations() {
        let mut v = record();
        remove(&mut v, "name");
        remove(&mut v, "energy_efficiency_source");
        v["installed_cost"] = json!(-5);
        v["market_exit_year"] = json!(2020);
        v["bldg_type"] = json!("castle");

        let report = validator().validate_value(&v);
        assert!(!report.by_kind(ViolationKind::Schema).is_empty());
        assert_eq!(report.by_kind(ViolationKind::Citation).len(), 1);
        assert_eq!(report.by_kind(ViolationKind::Range).len(), 1);
        assert_eq!(report.by_kind(ViolationKind::Ordering).len(), 1);
        assert_eq!(report.by_kind(ViolationKind::Domain).len(), 1);
        assert!(report.len() >= 5);
    }

    #[test]
    fn test_float_entry_year_is_range_and_ordering() {
        let mut v = record();
        v["market_entry_year"] = json!(2030.0);
        v["market_exit_year"] = json!(2020);
        let report = validator().validate_value(&v);
        assert_eq!(report.len(), 2, "{report}");
        assert_eq!(report.by_kind(ViolationKind::Range).len(), 1);
        assert_eq!(report.by_kind(ViolationKind::Ordering).len(), 1);
    }

    #[test]
    fn test_oversized_entry_year_is_invalid() {
        let mut v = record();
        v["market_entry_year"] = json!(u64::MAX);
        let report = validator().validate_value(&v);
        assert!(!report.is_valid());
        let range = report.by_kind(ViolationKind::Range);
        assert_eq!(range.len(), 1, "{report}");
        assert_eq!(range[0].instance_path, "/market_entry_year");
    }

    #[test]
    fn test_null_quantity_needs_no_citation() {
        let mut v = record();
        v["energy_efficiency"] = Value::Null;
        v["energy_efficiency_source"] = Value::Null;
        let report = validator().validate_value(&v);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_null_quantity_without_citation_key() {
        let mut v = record();
        v["installed_cost"] = Value::Null;
        remove(&mut v, "installed_cost_source");
        assert!(validator().validate_value(&v).is_valid());
    }

    #[test]
    fn test_empty_savings_reference_reported_once() {
        let mut v = record();
        v["tsv_features"]["shape"]["custom_annual_savings"] = json!("");
        let report = validator().validate_value(&v);
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].kind, ViolationKind::Schema);
    }

    #[test]
    fn test_wrong_type_reported_once() {
        let mut v = record();
        v["installed_cost"] = json!("2033");
        let report = validator().validate_value(&v);
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].kind, ViolationKind::Schema);
        assert_eq!(report.violations()[0].instance_path, "/installed_cost");
    }

    #[test]
    fn test_non_object_record() {
        let report = validator().validate_value(&json!([1, 2, 3]));
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].kind, ViolationKind::Schema);
    }

    #[test]
    fn test_invalid_json_text() {
        let report = validator().validate_str("{ not json");
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.starts_with("invalid JSON"));
    }

    #[test]
    fn test_validate_file_missing() {
        let err = validator()
            .validate_file(Path::new("/nonexistent/measure.json"))
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::DocumentLoadError { .. }));
    }

    #[test]
    fn test_validate_dir_counts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_good.json"), RECORD).unwrap();
        let mut bad = record();
        remove(&mut bad, "installed_cost_source");
        std::fs::write(dir.path().join("b_bad.json"), bad.to_string()).unwrap();
        std::fs::write(dir.path().join("c_broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let batch = validator().validate_dir(dir.path()).unwrap();
        assert_eq!(batch.total, 3);
        assert_eq!(batch.passed, 1);
        assert_eq!(batch.failed, 2);
        assert!(!batch.is_valid());
        let failed: Vec<_> = batch
            .failures()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(failed, vec!["b_bad.json", "c_broken.json"]);
    }

    #[test]
    fn test_batch_record_counts() {
        let mut bad = ValidationReport::new();
        bad.push(Violation::rule(ViolationKind::Range, "/installed_cost", "bad"));
        let mut batch = BatchReport::default();
        batch.record(PathBuf::from("a.json"), ValidationReport::new());
        batch.record(PathBuf::from("b.json"), bad);
        assert_eq!((batch.total, batch.passed, batch.failed), (2, 1, 1));
        assert_eq!(batch.failures().next().unwrap().path, PathBuf::from("b.json"));
    }

    #[test]
    fn test_validate_dir_missing() {
        assert!(validator().validate_dir(Path::new("/nonexistent/measures")).is_err());
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::rule(
            ViolationKind::Citation,
            "/installed_cost_source",
            "missing citation for installed_cost",
        );
        assert_eq!(
            v.to_string(),
            "  /installed_cost_source: [citation] missing citation for installed_cost"
        );
        assert_eq!(v.schema_path, "#rule/citation");
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation::rule(ViolationKind::Schema, "", "invalid JSON");
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_report_serializes_as_list() {
        let mut report = ValidationReport::new();
        report.push(Violation::rule(ViolationKind::Range, "/installed_cost", "bad"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["kind"], "range");
        assert_eq!(json[0]["instance_path"], "/installed_cost");
    }
}
