//! Source digests
//!
//! Provides [`SourceDigest`], a 32-byte Blake3 digest of the raw bytes a
//! constellation was ingested from. Recorded alongside file ingress so a
//! caller can tell whether a re-read document changed.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest of ingested bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceDigest([u8; 32]);

impl SourceDigest {
    /// Create a digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for SourceDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for SourceDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl serde::Serialize for SourceDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> serde::Deserialize<'de> for SourceDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors decoding a digest
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Hex string of the wrong size
    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Not hex
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = SourceDigest::compute(b"<eac-cpf/>");
        let b = SourceDigest::compute(b"<eac-cpf/>");
        assert_eq!(a, b);
        assert_ne!(a, SourceDigest::compute(b"<eac-cpf></eac-cpf>"));
    }

    #[test]
    fn digest_hex_roundtrip() {
        let digest = SourceDigest::compute(b"record");
        let parsed: SourceDigest = digest.to_string().parse().unwrap();
        assert_eq!(parsed, digest);
        assert_eq!(digest.short().len(), 16);
    }

    #[test]
    fn digest_rejects_short_hex() {
        assert!(matches!(
            "abcd".parse::<SourceDigest>(),
            Err(DigestError::InvalidLength { actual: 2, .. })
        ));
    }

    #[test]
    fn digest_serde_json() {
        let digest = SourceDigest::compute(b"x");
        let json = serde_json::to_string(&digest).unwrap();
        let back: SourceDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
