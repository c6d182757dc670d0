// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-hash codec for the USER_DATA QoS byte string.
//!
//! Endpoints announce the hash of their message type inside the opaque
//! USER_DATA QoS field, formatted as a `key=value;` list. The well-known
//! `typehash` key carries the hash's canonical string form
//! `RIHS<version>_<64 lowercase hex chars>`; other keys are preserved by the
//! parser but ignored here.

use crate::{Error, Result};
use std::fmt;

/// Size (in bytes) of a type hash value (SHA-256).
pub const TYPE_HASH_SIZE: usize = 32;

/// Structured hash of a message type definition.
///
/// `version == 0` means "unset": the hash is unknown and compares equal to
/// [`TypeHash::zero`]. Version 1 is the only version currently emitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeHash {
    /// Hash algorithm/layout version, 0 when unset.
    pub version: u8,
    /// Raw hash bytes.
    pub value: [u8; TYPE_HASH_SIZE],
}

impl TypeHash {
    /// The zero value: version unset, all hash bytes zero.
    pub const fn zero() -> Self {
        Self {
            version: 0,
            value: [0; TYPE_HASH_SIZE],
        }
    }

    /// Create a version-1 hash from raw bytes.
    pub const fn new(value: [u8; TYPE_HASH_SIZE]) -> Self {
        Self { version: 1, value }
    }

    /// Whether the hash version is unset.
    pub fn is_zero(&self) -> bool {
        self.version == 0
    }

    /// Parse the canonical `RIHS<version>_<hex>` string form.
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text
            .strip_prefix("RIHS")
            .ok_or_else(|| Error::InvalidTypeHash(format!("missing RIHS prefix: {:?}", text)))?;
        let (version_str, hex) = rest
            .split_once('_')
            .ok_or_else(|| Error::InvalidTypeHash(format!("missing version separator: {:?}", text)))?;
        let version: u8 = version_str
            .parse()
            .map_err(|_| Error::InvalidTypeHash(format!("bad version field: {:?}", version_str)))?;
        if version == 0 {
            return Err(Error::InvalidTypeHash("version 0 is reserved for unset".to_string()));
        }
        if hex.len() != TYPE_HASH_SIZE * 2 {
            return Err(Error::InvalidTypeHash(format!(
                "expected {} hex chars, got {}",
                TYPE_HASH_SIZE * 2,
                hex.len()
            )));
        }
        let mut value = [0u8; TYPE_HASH_SIZE];
        for (i, byte) in value.iter_mut().enumerate() {
            let pair = &hex[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::InvalidTypeHash(format!("bad hex pair: {:?}", pair)))?;
        }
        Ok(Self { version, value })
    }
}

impl fmt::Display for TypeHash {
    /// Canonical string form; unset hashes render as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return Ok(());
        }
        write!(f, "RIHS{:02}_", self.version)?;
        for byte in &self.value {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Split a USER_DATA byte string into `key=value` pairs.
///
/// Segments are `;`-separated; a segment without `=` or with an empty key is
/// skipped. Returns borrowed byte slices, in announcement order.
fn parse_key_value(user_data: &[u8]) -> Vec<(&[u8], &[u8])> {
    user_data
        .split(|&b| b == b';')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let eq = segment.iter().position(|&b| b == b'=')?;
            let (key, rest) = segment.split_at(eq);
            if key.is_empty() {
                return None;
            }
            Some((key, &rest[1..]))
        })
        .collect()
}

/// Extract the announced type hash from a USER_DATA byte string.
///
/// A missing `typehash` key is not an error: older peers do not announce
/// hashes, so the zero value is returned. A present but malformed value is
/// reported as [`Error::InvalidTypeHash`].
pub fn parse_type_hash_from_user_data(user_data: &[u8]) -> Result<TypeHash> {
    let pairs = parse_key_value(user_data);
    let Some((_, value)) = pairs.iter().find(|(key, _)| *key == b"typehash") else {
        return Ok(TypeHash::zero());
    };
    let text = std::str::from_utf8(value)
        .map_err(|_| Error::InvalidTypeHash("typehash value is not valid UTF-8".to_string()))?;
    TypeHash::parse(text)
}

/// Encode a type hash as a USER_DATA fragment.
///
/// Returns `"typehash=<canonical form>;"`, or the empty string when the
/// hash version is unset (nothing worth announcing).
pub fn encode_type_hash_for_user_data_qos(type_hash: &TypeHash) -> String {
    if type_hash.is_zero() {
        return String::new();
    }
    format!("typehash={};", type_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> TypeHash {
        let mut value = [0u8; TYPE_HASH_SIZE];
        for (i, byte) in value.iter_mut().enumerate() {
            *byte = i as u8;
        }
        TypeHash::new(value)
    }

    #[test]
    fn test_zero_hash_is_unset() {
        assert!(TypeHash::zero().is_zero());
        assert!(!sample_hash().is_zero());
    }

    #[test]
    fn test_display_round_trip() {
        let hash = sample_hash();
        let text = hash.to_string();
        assert!(text.starts_with("RIHS01_"));
        assert_eq!(text.len(), 7 + TYPE_HASH_SIZE * 2);
        assert_eq!(TypeHash::parse(&text).unwrap(), hash);
    }

    #[test]
    fn test_display_of_zero_hash_is_empty() {
        assert_eq!(TypeHash::zero().to_string(), "");
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert!(TypeHash::parse("HASH01_00").is_err());
    }

    #[test]
    fn test_parse_rejects_short_value() {
        assert!(TypeHash::parse("RIHS01_0011").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let text = format!("RIHS01_{}", "zz".repeat(TYPE_HASH_SIZE));
        assert!(TypeHash::parse(&text).is_err());
    }

    #[test]
    fn test_user_data_round_trip() {
        let hash = sample_hash();
        let encoded = encode_type_hash_for_user_data_qos(&hash);
        assert!(encoded.starts_with("typehash=RIHS01_"));
        assert!(encoded.ends_with(';'));
        let parsed = parse_type_hash_from_user_data(encoded.as_bytes()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_user_data_with_other_keys() {
        let hash = sample_hash();
        let user_data = format!("foo=bar;typehash={};baz=qux;", hash);
        let parsed = parse_type_hash_from_user_data(user_data.as_bytes()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_user_data_without_typehash_key() {
        let parsed = parse_type_hash_from_user_data(b"foo=bar;baz=qux;").unwrap();
        assert_eq!(parsed, TypeHash::zero());
    }

    #[test]
    fn test_user_data_empty() {
        let parsed = parse_type_hash_from_user_data(b"").unwrap();
        assert_eq!(parsed, TypeHash::zero());
    }

    #[test]
    fn test_user_data_malformed_segments_are_skipped() {
        let parsed = parse_type_hash_from_user_data(b"novalue;=nokey;foo=bar;").unwrap();
        assert_eq!(parsed, TypeHash::zero());
    }

    #[test]
    fn test_user_data_malformed_hash_is_error() {
        assert!(parse_type_hash_from_user_data(b"typehash=RIHS01_bogus;").is_err());
    }

    #[test]
    fn test_encode_of_zero_hash_is_empty() {
        assert_eq!(encode_type_hash_for_user_data_qos(&TypeHash::zero()), "");
    }
}
