//! Content hashing.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Error decoding a [`Hash`] from its hex representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexError {
    /// The string does not decode to exactly 32 bytes.
    #[error("expected {expected} hex characters, got {actual}")]
    BadLength { expected: usize, actual: usize },

    /// The string contains non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A 32-byte SHA-256 content hash.
///
/// Transactions and proposals are content-addressed: equality of the hash
/// is equality of the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Length of the hex representation.
    pub const HEX_LEN: usize = 64;

    /// Hash arbitrary bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Hash(hasher.finalize().into())
    }

    /// Wrap an already-computed digest.
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from a lowercase or uppercase hex string.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        if s.len() != Self::HEX_LEN {
            return Err(HexError::BadLength {
                expected: Self::HEX_LEN,
                actual: s.len(),
            });
        }
        let decoded = hex::decode(s)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Hash(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        write!(f, "Hash({}…)", &self.to_hex()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_is_deterministic() {
        assert_eq!(Hash::from_bytes(b"payload"), Hash::from_bytes(b"payload"));
        assert_ne!(Hash::from_bytes(b"payload"), Hash::from_bytes(b"other"));
    }

    #[test]
    fn test_hex_round_trip() {
        let hash = Hash::from_bytes(b"round trip");
        let decoded = Hash::from_hex(&hash.to_hex()).expect("valid hex");
        assert_eq!(hash, decoded);
    }

    #[test]
    fn test_from_hex_rejects_bad_length() {
        assert!(matches!(
            Hash::from_hex("abcd"),
            Err(HexError::BadLength { actual: 4, .. })
        ));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let s = "z".repeat(Hash::HEX_LEN);
        assert!(matches!(Hash::from_hex(&s), Err(HexError::InvalidHex(_))));
    }
}
