//! The signing capability consumed by the request protocol.

use crate::encoding::{decode_base58, decode_base58_array, encode_base58, IdentifierError};
use core::future::Future;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use snowy_constants::{DIGEST_LEN, PUBKEY_LEN, SIGNATURE_LEN};
use std::fmt;

/// Error returned by a wallet that failed to sign.
pub type WalletError = Box<dyn core::error::Error + Send + Sync>;

/// A wallet able to sign request digests with a key it exclusively controls.
///
/// Implementors are adapters over whatever holds the private key: a browser
/// extension bridge, a hardware device, a remote signer. The protocol never
/// sees the key itself.
///
/// Cancelling a request while the wallet is signing is best-effort only up to
/// this boundary: once `sign` has been called, the returned future is always
/// polled to completion.
pub trait WalletIdentity {
    /// The base58 encoded 32 byte public key of the wallet.
    fn public_key_id(&self) -> &str;

    /// Sign a 32 byte digest, returning the raw signature bytes.
    ///
    /// Well-behaved wallets return 64 bytes. Any other length is rejected by
    /// the caller.
    fn sign(
        &self,
        digest: &[u8; DIGEST_LEN],
    ) -> impl Future<Output = Result<Vec<u8>, WalletError>> + Send;
}

impl<W: WalletIdentity> WalletIdentity for &W {
    fn public_key_id(&self) -> &str {
        (**self).public_key_id()
    }

    fn sign(
        &self,
        digest: &[u8; DIGEST_LEN],
    ) -> impl Future<Output = Result<Vec<u8>, WalletError>> + Send {
        (**self).sign(digest)
    }
}

/// A 64 byte wallet signature over a request digest.
///
/// Serialized as base58 text, matching the wire format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestSignature([u8; SIGNATURE_LEN]);

impl RequestSignature {
    /// Wrap raw signature bytes.
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Encode the signature as base58.
    pub fn to_base58(&self) -> String {
        encode_base58(&self.0)
    }

    /// Decode a base58 signature. It must decode to exactly 64 bytes.
    pub fn from_base58(s: &str) -> Result<Self, IdentifierError> {
        decode_base58_array(s).map(Self)
    }
}

impl TryFrom<&[u8]> for RequestSignature {
    type Error = IdentifierError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; SIGNATURE_LEN]>::try_from(bytes).map(Self).map_err(|_| {
            IdentifierError::InvalidLength { expected: SIGNATURE_LEN, actual: bytes.len() }
        })
    }
}

impl fmt::Debug for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestSignature").field(&self.to_base58()).finish()
    }
}

impl fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl TryFrom<String> for RequestSignature {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_base58(&s)
    }
}

impl From<RequestSignature> for String {
    fn from(signature: RequestSignature) -> Self {
        signature.to_base58()
    }
}

/// Decode a base58 public key identifier. It must hold exactly 32 bytes.
pub fn decode_public_key_id(id: &str) -> Result<[u8; PUBKEY_LEN], IdentifierError> {
    decode_base58_array(id)
}

/// An in-process ed25519 wallet.
///
/// Useful for tests, demos and services that sign on their own behalf. It is
/// not a key custody solution.
#[derive(Clone)]
pub struct LocalWallet {
    key: SigningKey,
    public_key_id: String,
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("public_key_id", &self.public_key_id)
            .finish_non_exhaustive()
    }
}

impl LocalWallet {
    /// Create a wallet from a 32 byte secret seed.
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    /// Create a wallet with a fresh random key.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Create a wallet from a base58 secret.
    ///
    /// Accepts either a 32 byte seed or a 64 byte keypair (seed followed by
    /// public key). For keypairs, the public half must match the seed.
    pub fn from_base58_secret(secret: &str) -> Result<Self, IdentifierError> {
        let bytes = decode_base58(secret)?;
        if let Ok(seed) = <[u8; 32]>::try_from(bytes.as_slice()) {
            return Ok(Self::from_bytes(&seed));
        }
        if let Ok(keypair) = <[u8; 64]>::try_from(bytes.as_slice()) {
            return SigningKey::from_keypair_bytes(&keypair)
                .map(Self::from_signing_key)
                .map_err(|_| IdentifierError::InvalidPublicKey);
        }
        Err(IdentifierError::InvalidLength { expected: 32, actual: bytes.len() })
    }

    fn from_signing_key(key: SigningKey) -> Self {
        let public_key_id = encode_base58(key.verifying_key().as_bytes());
        Self { key, public_key_id }
    }

    /// The raw public key.
    pub fn public_key_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.key.verifying_key().to_bytes()
    }

    /// The ed25519 verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign a digest synchronously.
    pub fn sign_digest(&self, digest: &[u8; DIGEST_LEN]) -> [u8; SIGNATURE_LEN] {
        self.key.sign(digest).to_bytes()
    }
}

impl WalletIdentity for LocalWallet {
    fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    fn sign(
        &self,
        digest: &[u8; DIGEST_LEN],
    ) -> impl Future<Output = Result<Vec<u8>, WalletError>> + Send {
        let signature = self.sign_digest(digest);
        async move { Ok(signature.to_vec()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn public_key_id_is_base58_of_verifying_key() {
        let wallet = LocalWallet::from_bytes(&[1u8; 32]);
        let decoded = decode_public_key_id(wallet.public_key_id()).unwrap();
        assert_eq!(decoded, wallet.public_key_bytes());
    }

    #[tokio::test]
    async fn signs_digests() {
        let wallet = LocalWallet::random();
        let digest = [42u8; DIGEST_LEN];
        let signature = wallet.sign(&digest).await.unwrap();
        assert_eq!(signature.len(), 64);

        let signature = Signature::from_slice(&signature).unwrap();
        wallet.verifying_key().verify(&digest, &signature).unwrap();
    }

    #[test]
    fn parses_secrets() {
        let seed = [5u8; 32];
        let wallet = LocalWallet::from_bytes(&seed);

        let from_seed = LocalWallet::from_base58_secret(&encode_base58(&seed)).unwrap();
        assert_eq!(from_seed.public_key_id(), wallet.public_key_id());

        let mut keypair = seed.to_vec();
        keypair.extend_from_slice(&wallet.public_key_bytes());
        let from_keypair = LocalWallet::from_base58_secret(&encode_base58(&keypair)).unwrap();
        assert_eq!(from_keypair.public_key_id(), wallet.public_key_id());

        // mismatched public half
        keypair[63] ^= 0xff;
        assert!(LocalWallet::from_base58_secret(&encode_base58(&keypair)).is_err());

        assert_eq!(
            LocalWallet::from_base58_secret(&encode_base58(&[1u8; 16])).unwrap_err(),
            IdentifierError::InvalidLength { expected: 32, actual: 16 }
        );
    }

    #[test]
    fn signature_length_is_enforced() {
        assert!(RequestSignature::try_from(&[0u8; 64][..]).is_ok());
        assert_eq!(
            RequestSignature::try_from(&[0u8; 63][..]).unwrap_err(),
            IdentifierError::InvalidLength { expected: 64, actual: 63 }
        );
        let signature = RequestSignature::new([3u8; 64]);
        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(serde_json::from_str::<RequestSignature>(&json).unwrap(), signature);
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let wallet = LocalWallet::from_bytes(&[9u8; 32]);
        let debug = format!("{wallet:?}");
        assert!(debug.contains(wallet.public_key_id()));
        assert!(!debug.contains("key:"));
    }
}
