//! Base58 text encoding for keys, digests and signatures.

use base58::{FromBase58, ToBase58};

/// Errors decoding a base58 identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IdentifierError {
    /// The string contains characters outside the base58 alphabet.
    #[error("invalid base58 string")]
    InvalidBase58,
    /// The string decodes to the wrong number of bytes.
    #[error("expected {expected} bytes, decoded {actual}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },
    /// The bytes are not a valid ed25519 public key.
    #[error("bytes are not a valid ed25519 public key")]
    InvalidPublicKey,
}

/// Encode bytes as base58.
pub fn encode_base58(bytes: &[u8]) -> String {
    bytes.to_base58()
}

/// Decode a base58 string of any length.
pub fn decode_base58(s: &str) -> Result<Vec<u8>, IdentifierError> {
    s.from_base58().map_err(|_| IdentifierError::InvalidBase58)
}

/// Decode a base58 string that must hold exactly `N` bytes.
pub fn decode_base58_array<const N: usize>(s: &str) -> Result<[u8; N], IdentifierError> {
    let bytes = decode_base58(s)?;
    <[u8; N]>::try_from(bytes.as_slice())
        .map_err(|_| IdentifierError::InvalidLength { expected: N, actual: bytes.len() })
}
