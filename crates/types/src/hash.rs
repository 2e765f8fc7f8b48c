use crate::encoding::{decode_base58_array, encode_base58, IdentifierError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use snowy_constants::DIGEST_LEN;
use std::{fmt, str::FromStr};

/// A 32 byte digest of a canonical request payload.
///
/// Serialized as base58 text, matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestHash([u8; DIGEST_LEN]);

impl RequestHash {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Encode the digest as base58.
    pub fn to_base58(&self) -> String {
        encode_base58(&self.0)
    }

    /// Decode a base58 digest. It must decode to exactly 32 bytes.
    pub fn from_base58(s: &str) -> Result<Self, IdentifierError> {
        decode_base58_array(s).map(Self)
    }
}

impl AsRef<[u8]> for RequestHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RequestHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for RequestHash {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl TryFrom<String> for RequestHash {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_base58(&s)
    }
}

impl From<RequestHash> for String {
    fn from(hash: RequestHash) -> Self {
        hash.to_base58()
    }
}

/// A hashing provider.
///
/// The protocol only requires a deterministic 32 byte digest. The provider is
/// chosen once, when a client is built, and passed down to every operation
/// that hashes.
pub trait RequestHasher {
    /// Digest the given bytes.
    fn digest(&self, bytes: &[u8]) -> RequestHash;

    /// Digest the given bytes and encode the result as base58.
    fn digest_base58(&self, bytes: &[u8]) -> String {
        self.digest(bytes).to_base58()
    }
}

impl<T: RequestHasher + ?Sized> RequestHasher for &T {
    fn digest(&self, bytes: &[u8]) -> RequestHash {
        (**self).digest(bytes)
    }
}

/// The default [`RequestHasher`], SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl RequestHasher for Sha256Hasher {
    fn digest(&self, bytes: &[u8]) -> RequestHash {
        sha256(bytes)
    }
}

/// SHA-256 digest of the given bytes.
pub fn sha256(bytes: &[u8]) -> RequestHash {
    RequestHash(Sha256::digest(bytes).into())
}

/// SHA-256 digest of the given bytes, base58 encoded.
pub fn sha256_base58(bytes: &[u8]) -> String {
    sha256(bytes).to_base58()
}
