//! # Error Types
//!
//! Errors raised while parsing, canonicalizing, or interpreting measure
//! records. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! Validation findings are *not* errors: the validator in `ecm-schema`
//! collects them into a report. The types here cover operations that cannot
//! produce a meaningful result at all.

use thiserror::Error;

/// Top-level error type for ECM core operations.
#[derive(Error, Debug)]
pub enum EcmError {
    /// The document is not a well-formed measure record.
    #[error("parse error: {0}")]
    Parse(String),

    /// Serialization of a typed record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A provenance timestamp could not be interpreted as UTC.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The raw timestamp string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A string that is not a `sha256:<hex>` content digest.
    #[error("invalid digest {value:?}: {reason}")]
    InvalidDigest {
        /// The raw digest string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A value outside a closed vocabulary.
    #[error("invalid {field} value: {value:?}")]
    InvalidDomainValue {
        /// Field whose vocabulary was violated.
        field: String,
        /// The offending value.
        value: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
