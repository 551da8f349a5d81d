//! # Content Digest
//!
//! A published measure record is identified by the SHA-256 digest of its
//! canonical bytes, written `sha256:<64 lowercase hex>`. A digest can only be
//! computed from [`CanonicalBytes`], so it does not depend on key order or
//! whitespace in the record file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::EcmError;

const PREFIX: &str = "sha256:";

/// SHA-256 digest of a record's canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Hash canonical bytes.
    pub fn of(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The digest as lowercase hex, without the `sha256:` tag.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = EcmError;

    /// Parse `sha256:<hex>`; hex digits may be either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| EcmError::InvalidDigest {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let hex = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| invalid("expected a sha256: prefix"))?;
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("expected 64 hex digits"));
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
                .map_err(|_| invalid("expected 64 hex digits"))?;
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = EcmError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContentDigest> for String {
    fn from(d: ContentDigest) -> Self {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_OBJECT: &str =
        "sha256:44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a";

    #[test]
    fn test_empty_object_digest() {
        // SHA-256 of the two bytes "{}".
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(ContentDigest::of(&cb).to_string(), EMPTY_OBJECT);
    }

    #[test]
    fn test_key_order_does_not_change_digest() {
        let a = CanonicalBytes::new(&serde_json::json!({"a": 1, "b": [1, 2]})).unwrap();
        let b = CanonicalBytes::new(&serde_json::json!({"b": [1, 2], "a": 1})).unwrap();
        assert_eq!(ContentDigest::of(&a), ContentDigest::of(&b));
    }

    #[test]
    fn test_parse_display_form() {
        let d: ContentDigest = EMPTY_OBJECT.parse().unwrap();
        assert_eq!(d.to_string(), EMPTY_OBJECT);
        assert_eq!(d.as_bytes()[0], 0x44);
        let upper = format!("sha256:{}", d.to_hex().to_uppercase());
        assert_eq!(upper.parse::<ContentDigest>().unwrap(), d);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("44136fa3".parse::<ContentDigest>().is_err());
        assert!("sha256:xyz".parse::<ContentDigest>().is_err());
        assert!("md5:44136fa355b3678a1146ad16f7e8649e".parse::<ContentDigest>().is_err());
        let bad_digit = format!("sha256:{}", "g".repeat(64));
        assert!(bad_digit.parse::<ContentDigest>().is_err());
    }

    #[test]
    fn test_serde_uses_display_form() {
        let d: ContentDigest = EMPTY_OBJECT.parse().unwrap();
        let json = serde_json::to_value(d).unwrap();
        assert_eq!(json, serde_json::json!(EMPTY_OBJECT));
        let back: ContentDigest = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_value::<ContentDigest>(serde_json::json!("sha256:00")).is_err());
    }
}
