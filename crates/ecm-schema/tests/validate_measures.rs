//! Integration test: validate every published record under `measures/`.
//!
//! Published records must pass with zero violations and must survive a
//! parse/serialize round-trip through the typed model unchanged. If a record
//! fails, fix the record; do not relax the rules.

use std::path::PathBuf;

use ecm_core::MeasureDescriptor;
use ecm_schema::{MeasureValidator, ValidatorConfig, ViolationKind};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn measures_dir() -> PathBuf {
    repo_root().join("measures")
}

fn validator() -> MeasureValidator {
    MeasureValidator::new(ValidatorConfig::default()).expect("bundled schema compiles")
}

fn hpwh_record() -> Value {
    let path = measures_dir().join("residential_best_hpwh_dr.json");
    let content = std::fs::read_to_string(path).expect("published record exists");
    serde_json::from_str(&content).expect("published record is JSON")
}

#[test]
fn test_validate_all_measures() {
    let batch = validator()
        .validate_dir(&measures_dir())
        .expect("measures/ is readable");

    eprintln!(
        "\n=== Measure Validation Results ===\n\
         Total:  {}\n\
         Passed: {}\n\
         Failed: {}\n",
        batch.total, batch.passed, batch.failed
    );
    for failure in batch.failures() {
        eprintln!("FAIL: {}\n{}", failure.path.display(), failure.report);
    }

    assert!(batch.total >= 1, "expected at least one record in measures/");
    assert!(batch.is_valid(), "{} record(s) failed validation", batch.failed);
}

#[test]
fn test_all_measures_round_trip() {
    let entries = std::fs::read_dir(measures_dir()).expect("measures/ is readable");
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "json") {
            let value: Value =
                serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            assert!(
                MeasureDescriptor::round_trips(&value),
                "{} does not round-trip",
                path.display()
            );
        }
    }
}

/// Optional keys whose absence and explicit null must both survive a
/// round-trip: `(parent pointer, key)`.
const OPTIONAL_KEYS: [(&str, &str); 5] = [
    ("", "_updated_by"),
    ("", "tsv_features"),
    ("/tsv_features", "shape"),
    ("/energy_efficiency_source", "notes"),
    ("/installed_cost_source", "source_data"),
];

/// Apply one of three edits to an optional key: 0 keeps it, 1 removes it,
/// 2 sets it to null.
fn edit_optional(record: &mut Value, parent: &str, key: &str, edit: u8) {
    let Some(object) = record.pointer_mut(parent).and_then(Value::as_object_mut) else {
        return;
    };
    match edit {
        1 => {
            object.remove(key);
        }
        2 => {
            object.insert(key.to_string(), Value::Null);
        }
        _ => {}
    }
}

#[test]
fn test_absent_and_null_optional_keys_round_trip() {
    for (parent, key) in OPTIONAL_KEYS {
        for edit in [1, 2] {
            let mut record = hpwh_record();
            edit_optional(&mut record, parent, key, edit);
            assert!(
                MeasureDescriptor::round_trips(&record),
                "{parent}/{key} edit {edit} does not round-trip"
            );
            let report = validator().validate_value(&record);
            assert!(report.is_valid(), "{parent}/{key} edit {edit}:\n{report}");
        }
    }
}

#[test]
fn test_first_revision_without_updates_round_trips() {
    let mut record = hpwh_record();
    record.as_object_mut().unwrap().remove("_updated_by");
    let back = MeasureDescriptor::from_value(record.clone())
        .unwrap()
        .to_value()
        .unwrap();
    assert!(back.get("_updated_by").is_none());
    assert_eq!(back, record);
}

#[test]
fn test_null_quantities_validate_and_round_trip() {
    let mut record = hpwh_record();
    for field in ecm_core::QUANTITATIVE_FIELDS {
        record[*field] = Value::Null;
        record[format!("{field}_source")] = Value::Null;
    }
    assert!(MeasureDescriptor::round_trips(&record));
    let report = validator().validate_value(&record);
    assert!(report.is_valid(), "{report}");
}

#[test]
fn test_removing_installed_cost_citation() {
    let mut record = hpwh_record();
    record.as_object_mut().unwrap().remove("installed_cost_source");

    let report = validator().validate_value(&record);
    assert_eq!(report.len(), 1, "{report}");
    assert_eq!(
        report.violations()[0].message,
        "missing citation for installed_cost"
    );
}

#[test]
fn test_every_quantitative_field_needs_its_citation() {
    for field in ecm_core::QUANTITATIVE_FIELDS {
        let mut record = hpwh_record();
        record[format!("{field}_source")] = Value::Null;
        let report = validator().validate_value(&record);
        let citations = report.by_kind(ViolationKind::Citation);
        assert_eq!(citations.len(), 1, "{field}: {report}");
        assert_eq!(citations[0].message, format!("missing citation for {field}"));
    }
}

#[test]
fn test_dangling_tsv_reference_with_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = ValidatorConfig::default().with_tsv_dir(dir.path());
    let validator = MeasureValidator::new(config).unwrap();

    let report = validator.validate_value(&hpwh_record());
    assert_eq!(report.by_kind(ViolationKind::Reference).len(), 1, "{report}");

    std::fs::write(
        dir.path().join("P3d_Best_waterheater_DR_waterheater.csv"),
        "Hour,Relative Savings\n1,0.0\n",
    )
    .unwrap();
    assert!(validator.validate_value(&hpwh_record()).is_valid());
}

proptest! {
    #[test]
    fn optional_keys_round_trip(edits in proptest::collection::vec(0u8..3, OPTIONAL_KEYS.len())) {
        let mut record = hpwh_record();
        for ((parent, key), edit) in OPTIONAL_KEYS.iter().zip(&edits) {
            edit_optional(&mut record, parent, key, *edit);
        }
        prop_assert!(MeasureDescriptor::round_trips(&record), "{:?}", edits);
        prop_assert!(validator().validate_value(&record).is_valid());
    }

    #[test]
    fn exit_year_ordering(entry in 1990i64..=2100, exit in 1990i64..=2100) {
        let mut record = hpwh_record();
        record["market_entry_year"] = json!(entry);
        record["market_exit_year"] = json!(exit);
        let report = validator().validate_value(&record);
        let ordering = report.by_kind(ViolationKind::Ordering).len();
        prop_assert_eq!(ordering, usize::from(entry > exit));
        prop_assert_eq!(report.is_valid(), entry <= exit);
    }

    #[test]
    fn cost_and_lifetime_must_be_positive(cost in -1000.0f64..1000.0, life in -50.0f64..50.0) {
        let mut record = hpwh_record();
        record["installed_cost"] = json!(cost);
        record["product_lifetime"] = json!(life);
        let report = validator().validate_value(&record);
        let expected = usize::from(cost <= 0.0) + usize::from(life <= 0.0);
        prop_assert_eq!(report.by_kind(ViolationKind::Range).len(), expected);
    }
}
