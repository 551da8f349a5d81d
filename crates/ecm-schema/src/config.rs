//! # Validator Configuration
//!
//! Vocabularies and bounds used by the semantic rules. The defaults match
//! the downstream modeling tool; a project that models a subset of regions
//! or an extended building stock overrides them in a YAML or JSON file:
//!
//! ```yaml
//! entry_year_range: { min: 2020, max: 2060 }
//! structure_types: [new, existing]
//! tsv_dir: data/tsv
//! ```
//!
//! Keys not present in the file keep their defaults.

use std::path::{Path, PathBuf};

use ecm_core::{DomainField, MeasureType};
use serde::{Deserialize, Serialize};

use crate::validate::SchemaValidationError;

/// An inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl YearRange {
    pub fn contains(&self, year: i64) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self { min: 1990, max: 2100 }
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Settings for [`crate::MeasureValidator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Plausible market entry and exit years.
    pub entry_year_range: YearRange,
    pub climate_zones: Vec<String>,
    pub building_types: Vec<String>,
    pub structure_types: Vec<String>,
    pub measure_types: Vec<String>,
    /// Directory holding time-series CSV files. When unset, references
    /// are checked for form only.
    pub tsv_dir: Option<PathBuf>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let owned = |field: DomainField| -> Vec<String> {
            field
                .default_vocabulary()
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        Self {
            entry_year_range: YearRange::default(),
            climate_zones: owned(DomainField::ClimateZone),
            building_types: owned(DomainField::BldgType),
            structure_types: owned(DomainField::StructureType),
            measure_types: MeasureType::all()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            tsv_dir: None,
        }
    }
}

impl ValidatorConfig {
    /// Load a configuration file, choosing the format from its extension
    /// (`.yaml`/`.yml` for YAML, anything else for JSON).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::ConfigLoadError`] if the file cannot
    /// be read or does not describe a valid configuration.
    pub fn from_path(path: &Path) -> Result<Self, SchemaValidationError> {
        let load_error = |reason: String| SchemaValidationError::ConfigLoadError {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| load_error(format!("cannot read file: {e}")))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?,
            _ => serde_json::from_str(&content)
                .map_err(|e| load_error(format!("invalid JSON: {e}")))?,
        };

        if config.entry_year_range.min > config.entry_year_range.max {
            return Err(load_error(format!(
                "entry_year_range is empty: {}",
                config.entry_year_range
            )));
        }

        tracing::debug!(path = %path.display(), "loaded validator config");
        Ok(config)
    }

    /// Replace the time-series directory.
    pub fn with_tsv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tsv_dir = Some(dir.into());
        self
    }

    /// The accepted values for a domain field, excluding the `all` wildcard.
    pub fn vocabulary(&self, field: DomainField) -> &[String] {
        match field {
            DomainField::ClimateZone => &self.climate_zones,
            DomainField::BldgType => &self.building_types,
            DomainField::StructureType => &self.structure_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_vocabularies() {
        let config = ValidatorConfig::default();
        assert!(config.climate_zones.iter().any(|z| z == "AIA_CZ3"));
        assert!(config.climate_zones.iter().any(|z| z == "NYUP"));
        assert!(config.building_types.iter().any(|b| b == "all residential"));
        assert_eq!(config.measure_types, vec!["full service", "add-on"]);
        assert!(config.tsv_dir.is_none());
    }

    #[test]
    fn test_year_range() {
        let r = YearRange::default();
        assert!(r.contains(1990));
        assert!(r.contains(2100));
        assert!(!r.contains(1989));
        assert!(!r.contains(20250));
        assert_eq!(r.to_string(), "1990..=2100");
    }

    #[test]
    fn test_yaml_partial_override_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecm.yaml");
        std::fs::write(
            &path,
            "entry_year_range: { min: 2020, max: 2060 }\nstructure_types: [existing]\ntsv_dir: data/tsv\n",
        )
        .unwrap();

        let config = ValidatorConfig::from_path(&path).unwrap();
        assert_eq!(config.entry_year_range, YearRange { min: 2020, max: 2060 });
        assert_eq!(config.structure_types, vec!["existing"]);
        assert_eq!(config.tsv_dir, Some(PathBuf::from("data/tsv")));
        assert_eq!(config.measure_types, ValidatorConfig::default().measure_types);
    }

    #[test]
    fn test_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecm.json");
        std::fs::write(&path, r#"{"measure_types": ["full service"]}"#).unwrap();
        let config = ValidatorConfig::from_path(&path).unwrap();
        assert_eq!(config.measure_types, vec!["full service"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecm.yaml");
        std::fs::write(&path, "entry_years: 5\n").unwrap();
        let err = ValidatorConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, SchemaValidationError::ConfigLoadError { .. }));
    }

    #[test]
    fn test_inverted_year_range_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ecm.yaml");
        std::fs::write(&path, "entry_year_range: { min: 2050, max: 2020 }\n").unwrap();
        assert!(ValidatorConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ValidatorConfig::from_path(Path::new("/nonexistent/ecm.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read file"));
    }
}
