//! # Semantic Rules
//!
//! Checks the JSON Schema cannot express: the citation contract, value
//! ranges, market year ordering, configured vocabularies, time-series file
//! references, and provenance.
//!
//! Every rule reads the raw JSON record and only inspects fields whose JSON
//! type is what the structural pass expects; anything else has already been
//! reported as a `Schema` violation.

use std::path::Path;

use ecm_core::{Citation, DomainField, Timestamp, ALL, QUANTITATIVE_FIELDS};
use serde_json::{Map, Value};

use crate::config::ValidatorConfig;
use crate::validate::{ValidationReport, Violation, ViolationKind};

type Record = Map<String, Value>;

/// Quantities that must be strictly positive.
const POSITIVE_FIELDS: &[&str] = &["installed_cost", "product_lifetime"];

const MARKET_YEAR_FIELDS: [&str; 2] = ["market_entry_year", "market_exit_year"];

/// Run every semantic rule against `instance`.
pub fn apply_all(instance: &Value, config: &ValidatorConfig, report: &mut ValidationReport) {
    let Some(record) = instance.as_object() else {
        return;
    };
    check_citations(record, report);
    check_ranges(record, config, report);
    check_ordering(record, report);
    check_domains(record, config, report);
    check_reference(record, config, report);
    check_provenance(record, report);
}

/// Every non-null quantitative value must carry a non-null, non-empty
/// `<field>_source`.
pub fn check_citations(record: &Record, report: &mut ValidationReport) {
    for field in QUANTITATIVE_FIELDS {
        match record.get(*field) {
            None | Some(Value::Null) => continue,
            Some(_) => {}
        }

        let key = format!("{field}_source");
        let path = format!("/{key}");
        match record.get(&key) {
            None | Some(Value::Null) => report.push(Violation::rule(
                ViolationKind::Citation,
                path,
                format!("missing citation for {field}"),
            )),
            Some(value @ Value::Object(_)) => {
                // A citation that does not deserialize has the wrong shape,
                // which the structural pass reports.
                if let Ok(citation) = serde_json::from_value::<Citation>(value.clone()) {
                    if citation.is_empty() {
                        report.push(Violation::rule(
                            ViolationKind::Citation,
                            path,
                            format!("empty citation for {field}"),
                        ));
                    }
                }
            }
            Some(_) => {}
        }
    }
}

/// Positive costs and lifetimes, non-negative efficiency, plausible years.
pub fn check_ranges(record: &Record, config: &ValidatorConfig, report: &mut ValidationReport) {
    for field in POSITIVE_FIELDS {
        if let Some(n) = record.get(*field).and_then(Value::as_f64) {
            if n <= 0.0 {
                report.push(Violation::rule(
                    ViolationKind::Range,
                    format!("/{field}"),
                    format!("{field} must be greater than 0, got {n}"),
                ));
            }
        }
    }

    if let Some(n) = record.get("energy_efficiency").and_then(Value::as_f64) {
        if n < 0.0 {
            report.push(Violation::rule(
                ViolationKind::Range,
                "/energy_efficiency",
                format!("energy_efficiency must not be negative, got {n}"),
            ));
        }
    }

    let range = config.entry_year_range;
    for field in MARKET_YEAR_FIELDS {
        let Some(value) = record.get(field).filter(|v| v.is_number()) else {
            continue;
        };
        let message = match market_year(value) {
            Some(year) if !range.contains(year) => {
                format!("{field} {year} is outside the plausible range {range}")
            }
            Some(_) if !value.is_i64() => {
                format!("{field} must be written as an integer, got {value}")
            }
            Some(_) => continue,
            None => format!("{field} {value} is not a calendar year"),
        };
        report.push(Violation::rule(
            ViolationKind::Range,
            format!("/{field}"),
            message,
        ));
    }
}

/// A JSON number as a whole calendar year, whatever its written form.
///
/// `2030` and `2030.0` both give 2030; a fraction, or a value outside the
/// `i32` years a typed record can hold, gives `None`.
fn market_year(value: &Value) -> Option<i64> {
    if let Some(year) = value.as_i64() {
        return i32::try_from(year).ok().map(i64::from);
    }
    let n = value.as_f64()?;
    if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
        return None;
    }
    Some(n as i64)
}

/// A measure cannot leave the market before it enters it.
pub fn check_ordering(record: &Record, report: &mut ValidationReport) {
    let entry = record.get("market_entry_year").and_then(Value::as_f64);
    let exit = record.get("market_exit_year").and_then(Value::as_f64);
    if let (Some(entry), Some(exit)) = (entry, exit) {
        if entry > exit {
            report.push(Violation::rule(
                ViolationKind::Ordering,
                "/market_exit_year",
                format!("market_exit_year {exit} precedes market_entry_year {entry}"),
            ));
        }
    }
}

/// Applicability fields and measure type belong to their vocabularies.
pub fn check_domains(record: &Record, config: &ValidatorConfig, report: &mut ValidationReport) {
    for field in DomainField::all() {
        let key = field.key();
        let vocabulary = config.vocabulary(*field);
        let accepts = |v: &str| v == ALL || vocabulary.iter().any(|known| known == v);

        match record.get(key) {
            Some(Value::String(v)) => {
                if !accepts(v) {
                    report.push(unknown_value(key, format!("/{key}"), v));
                }
            }
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if let Some(v) = item.as_str() {
                        if !accepts(v) {
                            report.push(unknown_value(key, format!("/{key}/{i}"), v));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(v) = record.get("measure_type").and_then(Value::as_str) {
        if !config.measure_types.iter().any(|t| t == v) {
            report.push(unknown_value("measure_type", "/measure_type".to_string(), v));
        }
    }
}

fn unknown_value(key: &str, path: String, value: &str) -> Violation {
    Violation::rule(
        ViolationKind::Domain,
        path,
        format!("unknown {key} value {value:?}"),
    )
}

/// `tsv_features.shape.custom_annual_savings` names a bare `.csv` file
/// and, when a data directory is configured, that file exists with a header.
pub fn check_reference(record: &Record, config: &ValidatorConfig, report: &mut ValidationReport) {
    let Some(file) = record
        .get("tsv_features")
        .and_then(|t| t.get("shape"))
        .and_then(|s| s.get("custom_annual_savings"))
        .and_then(Value::as_str)
    else {
        return;
    };

    // An empty name is a structural defect.
    if file.is_empty() {
        return;
    }

    let path = "/tsv_features/shape/custom_annual_savings";
    let is_bare = !file.contains(['/', '\\']) && file != "." && file != "..";
    let is_csv = file.to_ascii_lowercase().ends_with(".csv");
    if !is_bare || !is_csv {
        report.push(Violation::rule(
            ViolationKind::Reference,
            path,
            format!("custom_annual_savings must name a .csv file, got {file:?}"),
        ));
        return;
    }

    let Some(dir) = &config.tsv_dir else {
        return;
    };
    if let Err(reason) = check_tsv_file(&dir.join(file)) {
        report.push(Violation::rule(
            ViolationKind::Reference,
            path,
            format!("dangling reference to {file}: {reason}"),
        ));
    }
}

fn check_tsv_file(path: &Path) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("no such file in {}", path.parent().unwrap_or(path).display()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| format!("cannot open: {e}"))?;
    let headers = reader.headers().map_err(|e| format!("unreadable header: {e}"))?;
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("file has no header row".to_string());
    }
    tracing::debug!(path = %path.display(), columns = headers.len(), "resolved time-series reference");
    Ok(())
}

/// Contributors are complete, their timestamps are UTC, and the update
/// trail never predates the original entry or goes backwards.
pub fn check_provenance(record: &Record, report: &mut ValidationReport) {
    let added = record
        .get("_added_by")
        .and_then(Value::as_object)
        .and_then(|c| check_contributor(c, "/_added_by", report));

    let updates: Vec<(String, &Record)> = match record.get("_updated_by") {
        Some(Value::Object(c)) => vec![("/_updated_by".to_string(), c)],
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.as_object().map(|c| (format!("/_updated_by/{i}"), c)))
            .collect(),
        _ => Vec::new(),
    };

    let mut previous = added;
    for (path, contributor) in updates {
        let Some(ts) = check_contributor(contributor, &path, report) else {
            continue;
        };
        match (added, previous) {
            (Some(added), _) if ts < added => report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("{path}/timestamp"),
                format!("update at {ts} predates _added_by at {added}"),
            )),
            (_, Some(prev)) if ts < prev => report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("{path}/timestamp"),
                format!("update at {ts} is earlier than the preceding update at {prev}"),
            )),
            _ => {}
        }
        previous = Some(ts);
    }
}

/// Check one contributor; returns its timestamp when it parses.
fn check_contributor(
    contributor: &Record,
    path: &str,
    report: &mut ValidationReport,
) -> Option<Timestamp> {
    for key in ["name", "organization"] {
        if let Some(v) = contributor.get(key).and_then(Value::as_str) {
            if v.trim().is_empty() {
                report.push(Violation::rule(
                    ViolationKind::Provenance,
                    format!("{path}/{key}"),
                    format!("contributor {key} is empty"),
                ));
            }
        }
    }

    if let Some(email) = contributor.get("email").and_then(Value::as_str) {
        if !is_plausible_email(email) {
            report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("{path}/email"),
                format!("invalid contributor email {email:?}"),
            ));
        }
    }

    let raw = contributor.get("timestamp").and_then(Value::as_str)?;
    match Timestamp::parse_provenance(raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("{path}/timestamp"),
                e.to_string(),
            ));
            None
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
