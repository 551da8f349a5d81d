//! # Domain Vocabularies
//!
//! The enumerated categorical fields of a measure record. Values must match
//! the downstream modeling tool's vocabulary exactly; a misspelled building
//! type silently matches no baseline market there, so it is rejected here.
//!
//! `all` is accepted by every domain field as a wildcard. The residential
//! and commercial roll-ups (`all residential`, `all commercial`) are part of
//! the building type vocabulary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EcmError;

/// Wildcard accepted by every domain field.
pub const ALL: &str = "all";

/// AIA climate zones.
const AIA_CLIMATE_ZONES: &[&str] = &["AIA_CZ1", "AIA_CZ2", "AIA_CZ3", "AIA_CZ4", "AIA_CZ5"];

/// EIA Electricity Market Module regions.
const EMM_REGIONS: &[&str] = &[
    "TRE", "FRCC", "MISW", "MISC", "MISE", "MISS", "ISNE", "NYCW", "NYUP", "PJME", "PJMW",
    "PJMC", "PJMD", "SRCA", "SRSE", "SRCE", "SPPS", "SPPC", "SPPN", "SRSG", "CANO", "CASO",
    "NWPP", "RMRG", "BASN",
];

/// US state codes plus DC.
const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

const RESIDENTIAL_BUILDING_TYPES: &[&str] = &[
    "single family home",
    "multi family home",
    "mobile home",
    "all residential",
];

const COMMERCIAL_BUILDING_TYPES: &[&str] = &[
    "assembly",
    "education",
    "food sales",
    "food service",
    "health care",
    "lodging",
    "large office",
    "small office",
    "mercantile/service",
    "warehouse",
    "other",
    "all commercial",
];

const STRUCTURE_TYPES: &[&str] = &["new", "existing"];

/// Measure types understood by the modeling tool.
///
/// A full-service measure replaces the baseline equipment; an add-on
/// measure modifies it (controls, retrofits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    #[serde(rename = "full service")]
    FullService,
    #[serde(rename = "add-on")]
    AddOn,
}

impl MeasureType {
    /// All measure types in canonical order.
    pub fn all() -> &'static [MeasureType] {
        &[Self::FullService, Self::AddOn]
    }

    /// The wire string for this measure type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullService => "full service",
            Self::AddOn => "add-on",
        }
    }
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureType {
    type Err = EcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EcmError::InvalidDomainValue {
                field: "measure_type".to_string(),
                value: s.to_string(),
            })
    }
}

/// The enumerated applicability fields of a measure record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainField {
    ClimateZone,
    BldgType,
    StructureType,
}

impl DomainField {
    /// All domain fields in record order.
    pub fn all() -> &'static [DomainField] {
        &[Self::ClimateZone, Self::BldgType, Self::StructureType]
    }

    /// JSON key of this field in a measure record.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ClimateZone => "climate_zone",
            Self::BldgType => "bldg_type",
            Self::StructureType => "structure_type",
        }
    }

    /// The default vocabulary, excluding the [`ALL`] wildcard.
    pub fn default_vocabulary(&self) -> Vec<&'static str> {
        match self {
            Self::ClimateZone => AIA_CLIMATE_ZONES
                .iter()
                .chain(EMM_REGIONS)
                .chain(STATES)
                .copied()
                .collect(),
            Self::BldgType => RESIDENTIAL_BUILDING_TYPES
                .iter()
                .chain(COMMERCIAL_BUILDING_TYPES)
                .copied()
                .collect(),
            Self::StructureType => STRUCTURE_TYPES.to_vec(),
        }
    }
}

impl std::fmt::Display for DomainField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
