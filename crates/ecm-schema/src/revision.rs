//! # Revision Checks
//!
//! A published measure record is immutable; the only permitted change is
//! appending entries to `_updated_by`. When the content of a record does
//! change (a corrected cost, a new citation), the change must be accompanied
//! by a new `_updated_by` entry, and the existing trail must be left intact.

use ecm_core::{EcmError, MeasureDescriptor};

use crate::validate::{ValidationReport, Violation, ViolationKind};

/// Compare two revisions of the same record.
///
/// Reports, as `Provenance` violations:
/// - a changed `_added_by`,
/// - a removed or rewritten `_updated_by` entry,
/// - a changed record body without any appended `_updated_by` entry.
///
/// # Errors
///
/// Returns an error only if a record cannot be canonicalized for digesting.
pub fn check_revision(
    previous: &MeasureDescriptor,
    current: &MeasureDescriptor,
) -> Result<ValidationReport, EcmError> {
    let mut report = ValidationReport::new();

    if previous.added_by != current.added_by {
        report.push(Violation::rule(
            ViolationKind::Provenance,
            "/_added_by",
            "_added_by changed between revisions",
        ));
    }

    let before = previous.updates();
    let after = current.updates();

    for (i, entry) in before.iter().enumerate() {
        match after.get(i) {
            None => report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("/_updated_by/{i}"),
                format!("update entry {i} was removed"),
            )),
            Some(now) if now != entry => report.push(Violation::rule(
                ViolationKind::Provenance,
                format!("/_updated_by/{i}"),
                format!("update entry {i} was rewritten"),
            )),
            Some(_) => {}
        }
    }

    let appended = after.len().saturating_sub(before.len());
    let body_changed = previous.body_digest()? != current.body_digest()?;
    if body_changed && appended == 0 {
        report.push(Violation::rule(
            ViolationKind::Provenance,
            "",
            "record body changed without a new _updated_by entry",
        ));
    }

    tracing::debug!(
        appended,
        body_changed,
        violations = report.len(),
        "checked measure revision"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecm_core::Contributor;
    use serde_json::{Map, Number};

    const RECORD: &str = include_str!("../../../measures/residential_best_hpwh_dr.json");

    fn published() -> MeasureDescriptor {
        MeasureDescriptor::from_json_str(RECORD).unwrap()
    }

    fn reviewer(ts: &str) -> Contributor {
        Contributor {
            name: "Cost Reviewer".to_string(),
            organization: "Building Technologies Analysis Group".to_string(),
            email: "review@example.org".to_string(),
            timestamp: ts.to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_identical_revision_passes() {
        let report = check_revision(&published(), &published()).unwrap();
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_appended_update_passes() {
        let mut next = published();
        next.installed_cost = Some(Number::from(2150));
        next.record_update(reviewer("2025-11-03 10:00:00 UTC"));
        let report = check_revision(&published(), &next).unwrap();
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_silent_edit_fails() {
        let mut next = published();
        next.installed_cost = Some(Number::from(2150));
        let report = check_revision(&published(), &next).unwrap();
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.contains("without a new _updated_by"));
    }

    #[test]
    fn test_rewritten_history_fails() {
        let mut next = published();
        let mut entries = next.updates().to_vec();
        entries[0].timestamp = "2025-10-27 00:00:00 UTC".to_string();
        next.updated_by = Some(Some(ecm_core::UpdatedBy::Many(entries)));
        next.record_update(reviewer("2025-11-03 10:00:00 UTC"));

        let report = check_revision(&published(), &next).unwrap();
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].instance_path, "/_updated_by/0");
    }

    #[test]
    fn test_removed_history_fails() {
        let mut next = published();
        next.updated_by = None;
        let report = check_revision(&published(), &next).unwrap();
        assert_eq!(report.len(), 1, "{report}");
        assert!(report.violations()[0].message.contains("removed"));
    }

    #[test]
    fn test_changed_author_fails() {
        let mut next = published();
        next.added_by.name = "Someone Else".to_string();
        next.record_update(reviewer("2025-11-03 10:00:00 UTC"));
        let report = check_revision(&published(), &next).unwrap();
        assert_eq!(report.len(), 1, "{report}");
        assert_eq!(report.violations()[0].instance_path, "/_added_by");
    }
}
