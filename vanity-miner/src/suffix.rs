//! Suffix validation and case-insensitive matching

use crate::error::{MinerError, MinerResult};
use std::fmt;

/// Longest base58 encoding of a 32-byte public key
pub const MAX_SUFFIX_LEN: usize = 44;

/// A validated, lower-cased vanity suffix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Suffix(String);

impl Suffix {
    /// Validate user input. Letters of either case are fine since matching
    /// ignores case; `0` never appears in base58 so it can't match.
    pub fn parse(input: &str) -> MinerResult<Self> {
        let trimmed = input.trim();
        let invalid = |reason: &str| MinerError::InvalidSuffix {
            suffix: input.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("suffix is empty"));
        }
        if trimmed.len() > MAX_SUFFIX_LEN {
            return Err(invalid("suffix is longer than a public key"));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid("suffix must be alphanumeric"));
        }
        if trimmed.contains('0') {
            return Err(invalid("'0' is not in the base58 alphabet"));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare the tail of an encoded address, ignoring ASCII case
    pub fn matches(&self, encoded: &[u8]) -> bool {
        let suffix = self.0.as_bytes();
        if encoded.len() < suffix.len() {
            return false;
        }
        let start = encoded.len() - suffix.len();
        encoded[start..].eq_ignore_ascii_case(suffix)
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases() {
        let suffix = Suffix::parse(" PUMP ").unwrap();
        assert_eq!(suffix.as_str(), "pump");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Suffix::parse("").is_err());
        assert!(Suffix::parse("   ").is_err());
        assert!(Suffix::parse("ab-c").is_err());
        assert!(Suffix::parse("f00d").is_err());
        assert!(Suffix::parse(&"a".repeat(45)).is_err());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let suffix = Suffix::parse("Pump").unwrap();
        assert!(suffix.matches(b"7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgpump"));
        assert!(suffix.matches(b"XYZPUMP"));
        assert!(suffix.matches(b"XYZpUmP"));
        assert!(!suffix.matches(b"XYZPUMQ"));
        assert!(!suffix.matches(b"UMP"));
    }
}
