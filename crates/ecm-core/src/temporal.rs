//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds precision,
//! used to order provenance entries (`_added_by`, `_updated_by`).
//!
//! ## Accepted Forms
//!
//! Measure records written by hand carry timestamps in the form
//! `YYYY-MM-DD HH:MM:SS UTC`. Records produced by tooling carry RFC 3339
//! with a `Z` suffix. Both are accepted by [`Timestamp::parse_provenance`].
//! Explicit offsets (including `+00:00`) are rejected: a provenance trail
//! is compared lexically by reviewers, so there is exactly one zone.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EcmError;

/// Suffix used by the hand-written provenance format.
const UTC_SUFFIX: &str = " UTC";

/// Layout of the hand-written provenance format, without the suffix.
const PROVENANCE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a strict RFC 3339 timestamp with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`EcmError::InvalidTimestamp`] if the string is not RFC 3339
    /// or uses any suffix other than `Z`.
    pub fn parse(s: &str) -> Result<Self, EcmError> {
        if !s.ends_with('Z') {
            return Err(invalid(s, "must use Z suffix (UTC only)"));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| invalid(s, &e.to_string()))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a provenance timestamp in either accepted form.
    ///
    /// `2025-10-26 15:21:27 UTC` and `2025-10-26T15:21:27Z` denote the
    /// same instant.
    pub fn parse_provenance(s: &str) -> Result<Self, EcmError> {
        let trimmed = s.trim();
        if let Some(naive) = trimmed.strip_suffix(UTC_SUFFIX) {
            let dt = NaiveDateTime::parse_from_str(naive, PROVENANCE_LAYOUT)
                .map_err(|e| invalid(s, &e.to_string()))?;
            return Ok(Self(dt.and_utc()));
        }
        Self::parse(trimmed)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2025-10-26T15:21:27Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Render in the hand-written provenance form (e.g., `2025-10-26 15:21:27 UTC`).
    pub fn to_provenance(&self) -> String {
        format!("{}{UTC_SUFFIX}", self.0.format(PROVENANCE_LAYOUT))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn invalid(value: &str, reason: &str) -> EcmError {
    EcmError::InvalidTimestamp {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
