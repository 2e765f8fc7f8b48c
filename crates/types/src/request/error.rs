use crate::{canonical::CanonicalError, encoding::IdentifierError, wallet::WalletError};

/// Errors building or checking a signed request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    /// A caller supplied field failed validation. `field` is the wire name.
    #[error("invalid input field `{field}`: {reason}")]
    InvalidInput {
        /// Wire name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The wallet's public key identifier is not a 32 byte base58 key.
    #[error("invalid signer: {0}")]
    InvalidSigner(#[source] IdentifierError),
    /// The payload could not be canonicalized.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
    /// The wallet returned a signature of the wrong length.
    #[error("wallet returned a {len} byte signature, expected 64")]
    InvalidSignatureLength {
        /// Length of the returned signature.
        len: usize,
    },
    /// The wallet failed to sign.
    #[error("wallet failed to sign request: {0}")]
    SigningFailed(#[source] WalletError),
    /// `requestHash` does not match the digest of the canonical payload.
    #[error("request hash does not match the canonical payload")]
    HashMismatch,
    /// `signature` does not verify against `signer` over `requestHash`.
    #[error("signature does not verify against the signer")]
    InvalidSignature,
}

impl RequestError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field, reason: reason.into() }
    }
}
