//! # ecm-core — Foundational Types for ECM Records
//!
//! Defines the typed model of an energy conservation measure (ECM)
//! descriptor and the primitives every other crate in the workspace builds
//! on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Lossless typed model.** [`MeasureDescriptor`] names every field the
//!    downstream modeling tool reads and carries all other keys through a
//!    flattened map, so parse-then-serialize reproduces the input document.
//!
//! 2. **`CanonicalBytes` newtype.** Record digests flow through
//!    `CanonicalBytes::new()` (RFC 8785 JCS). A published record is identified
//!    by the digest of its canonical form, independent of key order or
//!    whitespace.
//!
//! 3. **Closed vocabularies as enums.** `MeasureType` and `DomainField` are
//!    exhaustive; adding a variant forces every consumer to handle it.
//!
//! 4. **UTC-only timestamps.** Provenance timestamps parse into [`Timestamp`],
//!    which rejects local offsets.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ecm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod domain;
pub mod error;
pub mod measure;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::ContentDigest;
pub use domain::{DomainField, MeasureType, ALL};
pub use error::{CanonicalizationError, EcmError};
pub use measure::{
    Citation, Contributor, DomainSelection, MeasureDescriptor, SavingsShape, SourceData,
    TsvFeatures, UpdatedBy, QUANTITATIVE_FIELDS,
};
pub use temporal::Timestamp;
