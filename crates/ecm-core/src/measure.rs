//! # Measure Descriptor
//!
//! The typed model of one energy conservation measure record: applicability
//! (climate zone, building type, structure type), the baseline it competes
//! against (end use, fuel, technology), market timing, the three cited
//! quantities (efficiency, installed cost, lifetime), and provenance.
//!
//! ## Lossless Round-Trip
//!
//! Keys the model does not name (`_description`, `_notes`,
//! `market_scaling_fractions`, ...) are kept in [`MeasureDescriptor::extra`]
//! and written back unchanged. Numeric quantities are held as
//! [`serde_json::Number`] so an integer cost stays an integer.
//!
//! Required nullable fields (`market_exit_year`, the quantities, the switch
//! targets) are `Option<T>`; they must be present and are always written. Optional nullable keys (the
//! `_source` citations, `tsv_features`, `_updated_by`, and the parts of a
//! citation) are `Option<Option<T>>`: the outer `None` is an absent key, which
//! stays absent, and `Some(None)` is an explicit `null`, which stays `null`.
//!
//! ## Immutability
//!
//! Once published, only `_updated_by` may grow. [`MeasureDescriptor::body_digest`]
//! hashes the record with `_updated_by` removed, so two revisions with equal
//! body digests differ only in their update trail.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::canonical::CanonicalBytes;
use crate::digest::ContentDigest;
use crate::domain::{DomainField, MeasureType};
use crate::error::EcmError;

/// Fields that carry a numeric value and must carry a matching `_source`.
pub const QUANTITATIVE_FIELDS: &[&str] = &["energy_efficiency", "installed_cost", "product_lifetime"];

/// Key of the append-only update trail.
const UPDATED_BY_KEY: &str = "_updated_by";

/// Serde adapter for optional keys whose value may be `null`.
///
/// Use with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
mod nullable {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

/// The value of an optional nullable key, if it is present and not `null`.
fn present<T>(field: &Option<Option<T>>) -> Option<&T> {
    field.as_ref().and_then(Option::as_ref)
}

/// A domain field value: a single entry or a list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainSelection {
    One(String),
    Many(Vec<String>),
}

impl DomainSelection {
    /// The selected values in record order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(v) => vec![v.as_str()],
            Self::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the selection is the `all` wildcard.
    pub fn is_all(&self) -> bool {
        self.values() == [crate::domain::ALL]
    }
}

/// Citation metadata documenting where a quantitative value came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub source_data: Option<Option<SourceData>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Citation {
    /// Whether the citation documents anything at all.
    pub fn is_empty(&self) -> bool {
        let notes_empty = present(&self.notes).map_or(true, |n| n.trim().is_empty());
        let data_empty = present(&self.source_data).map_or(true, SourceData::is_empty);
        notes_empty && data_empty
    }
}

/// One bibliographic record or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceData {
    One(Map<String, Value>),
    Many(Vec<Map<String, Value>>),
}

impl SourceData {
    /// The bibliographic records in order.
    pub fn records(&self) -> Vec<&Map<String, Value>> {
        match self {
            Self::One(r) => vec![r],
            Self::Many(rs) => rs.iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records().iter().all(|r| r.is_empty())
    }
}

/// A provenance entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub organization: String,
    pub email: String,
    /// Kept as written; see [`crate::Timestamp::parse_provenance`].
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `_updated_by` trail: a single entry or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdatedBy {
    One(Contributor),
    Many(Vec<Contributor>),
}

impl UpdatedBy {
    pub fn entries(&self) -> &[Contributor] {
        match self {
            Self::One(c) => std::slice::from_ref(c),
            Self::Many(cs) => cs,
        }
    }
}

/// Time-series (TSV) features of a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsvFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub shape: Option<Option<SavingsShape>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Load or savings shape references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsShape {
    /// Filename of an external CSV of hourly relative savings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_annual_savings: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One energy conservation measure record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureDescriptor {
    pub name: String,
    pub climate_zone: DomainSelection,
    pub bldg_type: DomainSelection,
    pub structure_type: DomainSelection,
    pub end_use: String,
    pub fuel_type: String,
    pub technology: String,
    pub market_entry_year: i32,
    /// `None` means the measure stays on the market indefinitely.
    #[serde(deserialize_with = "Option::deserialize")]
    pub market_exit_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub tsv_features: Option<Option<TsvFeatures>>,
    /// `None` when the efficiency is not quantified.
    #[serde(deserialize_with = "Option::deserialize")]
    pub energy_efficiency: Option<Number>,
    pub energy_efficiency_units: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub energy_efficiency_source: Option<Option<Citation>>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub installed_cost: Option<Number>,
    pub installed_cost_units: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub installed_cost_source: Option<Option<Citation>>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub product_lifetime: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_lifetime_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable")]
    pub product_lifetime_source: Option<Option<Citation>>,
    pub measure_type: MeasureType,
    #[serde(deserialize_with = "Option::deserialize")]
    pub fuel_switch_to: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub tech_switch_to: Option<String>,
    #[serde(rename = "_added_by")]
    pub added_by: Contributor,
    #[serde(
        rename = "_updated_by",
        default,
        skip_serializing_if = "Option::is_none",
        with = "nullable"
    )]
    pub updated_by: Option<Option<UpdatedBy>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MeasureDescriptor {
    /// Parse a record from JSON text.
    pub fn from_json_str(s: &str) -> Result<Self, EcmError> {
        serde_json::from_str(s).map_err(|e| EcmError::Parse(e.to_string()))
    }

    /// Parse a record from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, EcmError> {
        serde_json::from_value(value).map_err(|e| EcmError::Parse(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, EcmError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EcmError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether parsing `value` and serializing the result reproduces it.
    ///
    /// Object comparison is key-order-insensitive.
    pub fn round_trips(value: &Value) -> bool {
        Self::from_value(value.clone())
            .and_then(|m| m.to_value())
            .map_or(false, |back| &back == value)
    }

    /// The selection for one of the enumerated applicability fields.
    pub fn domain(&self, field: DomainField) -> &DomainSelection {
        match field {
            DomainField::ClimateZone => &self.climate_zone,
            DomainField::BldgType => &self.bldg_type,
            DomainField::StructureType => &self.structure_type,
        }
    }

    /// `(field, value, citation)` for each of [`QUANTITATIVE_FIELDS`].
    pub fn quantities(&self) -> [(&'static str, Option<&Number>, Option<&Citation>); 3] {
        [
            (
                QUANTITATIVE_FIELDS[0],
                self.energy_efficiency.as_ref(),
                present(&self.energy_efficiency_source),
            ),
            (
                QUANTITATIVE_FIELDS[1],
                self.installed_cost.as_ref(),
                present(&self.installed_cost_source),
            ),
            (
                QUANTITATIVE_FIELDS[2],
                self.product_lifetime.as_ref(),
                present(&self.product_lifetime_source),
            ),
        ]
    }

    /// Filename of the custom annual savings shape, if any.
    pub fn custom_savings_file(&self) -> Option<&str> {
        present(&self.tsv_features)
            .and_then(|t| present(&t.shape))
            .and_then(|s| s.custom_annual_savings.as_deref())
    }

    /// Whether the measure moves the market to a different fuel or technology.
    pub fn is_switching(&self) -> bool {
        self.fuel_switch_to.is_some() || self.tech_switch_to.is_some()
    }

    /// The `_updated_by` entries, in order; empty when absent or `null`.
    pub fn updates(&self) -> &[Contributor] {
        present(&self.updated_by).map_or(&[][..], UpdatedBy::entries)
    }

    /// `_added_by` followed by every `_updated_by` entry, in order.
    pub fn contributors(&self) -> Vec<&Contributor> {
        let mut out = vec![&self.added_by];
        out.extend(self.updates());
        out
    }

    /// Append an entry to the update trail.
    pub fn record_update(&mut self, contributor: Contributor) {
        self.updated_by = Some(Some(match self.updated_by.take().flatten() {
            None => UpdatedBy::Many(vec![contributor]),
            Some(UpdatedBy::One(first)) => UpdatedBy::Many(vec![first, contributor]),
            Some(UpdatedBy::Many(mut all)) => {
                all.push(contributor);
                UpdatedBy::Many(all)
            }
        }));
    }

    /// Digest of the whole record.
    pub fn digest(&self) -> Result<ContentDigest, EcmError> {
        Ok(ContentDigest::of(&CanonicalBytes::new(self)?))
    }

    /// Digest of the record without its update trail.
    pub fn body_digest(&self) -> Result<ContentDigest, EcmError> {
        let mut value = self.to_value()?;
        if let Value::Object(map) = &mut value {
            map.remove(UPDATED_BY_KEY);
        }
        Ok(ContentDigest::of(&CanonicalBytes::new(&value)?))
    }
}
