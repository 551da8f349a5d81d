//! # Canonical Serialization
//!
//! `CanonicalBytes` is the JSON Canonicalization Scheme (RFC 8785) encoding
//! of a value: object keys sorted, no insignificant whitespace, numbers in
//! their shortest round-trip form. Two records that differ only in key order
//! or formatting produce identical canonical bytes.
//!
//! Measure data is fractional (efficiencies, savings shares), so floats are
//! accepted here; JCS defines their encoding precisely.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// RFC 8785 canonical JSON bytes. The only input accepted by
/// [`crate::ContentDigest::of`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
