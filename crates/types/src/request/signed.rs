use crate::{
    canonical::to_canonical_string,
    encoding::IdentifierError,
    hash::{RequestHash, RequestHasher, Sha256Hasher},
    request::{GenerateInput, ModelKind, RequestError},
    wallet::{decode_public_key_id, RequestSignature, WalletIdentity},
};
use chrono::Utc;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// The exact payload that is canonicalized, hashed and signed.
///
/// Wire names are camelCase. The canonical form sorts keys, so field order
/// here has no effect on the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashableRequest {
    program_id: String,
    model: ModelKind,
    prompt: String,
    temperature: f64,
    max_tokens: u32,
    timestamp: i64,
    signer: String,
}

impl HashableRequest {
    /// Get the program identifier the request is bound to.
    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Get the model.
    pub const fn model(&self) -> ModelKind {
        self.model
    }

    /// Get the prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Get the temperature.
    pub const fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the token limit.
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Get the request timestamp in unix milliseconds.
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Get the base58 public key of the signer.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    /// The canonical JSON text of this payload.
    pub fn canonical_json(&self) -> Result<String, RequestError> {
        to_canonical_string(self).map_err(Into::into)
    }

    /// Digest the canonical JSON of this payload.
    pub fn request_hash<H: RequestHasher>(&self, hasher: &H) -> Result<RequestHash, RequestError> {
        self.canonical_json().map(|json| hasher.digest(json.as_bytes()))
    }
}

/// A request bound to a wallet by its hash and signature.
///
/// Serializes to the flat wire body the router expects:
///
/// ```json
/// { "programId": "..", "model": "snowy-base", "prompt": "..",
///   "temperature": 0.2, "maxTokens": 16, "timestamp": 1730000000000,
///   "signer": "..", "requestHash": "..", "signature": ".." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRequest {
    #[serde(flatten)]
    request: HashableRequest,
    request_hash: RequestHash,
    signature: RequestSignature,
}

impl SignedRequest {
    /// Get the signed payload.
    pub const fn hashable(&self) -> &HashableRequest {
        &self.request
    }

    /// Get the request hash.
    pub const fn request_hash(&self) -> &RequestHash {
        &self.request_hash
    }

    /// Get the signature over the raw request hash.
    pub const fn signature(&self) -> &RequestSignature {
        &self.signature
    }

    /// Get the program identifier the request is bound to.
    pub fn program_id(&self) -> &str {
        self.request.program_id()
    }

    /// Get the base58 public key of the signer.
    pub fn signer(&self) -> &str {
        self.request.signer()
    }

    /// Decompose into the payload, hash and signature.
    pub fn into_parts(self) -> (HashableRequest, RequestHash, RequestSignature) {
        (self.request, self.request_hash, self.signature)
    }

    /// Check that `requestHash` is the digest of the canonical payload.
    pub fn verify_hash<H: RequestHasher>(&self, hasher: &H) -> Result<(), RequestError> {
        if self.request.request_hash(hasher)? != self.request_hash {
            return Err(RequestError::HashMismatch);
        }
        Ok(())
    }

    /// Check that `signature` is a valid ed25519 signature by `signer` over
    /// the raw request hash bytes.
    pub fn verify_signature(&self) -> Result<(), RequestError> {
        let signer =
            decode_public_key_id(self.signer()).map_err(RequestError::InvalidSigner)?;
        let key = VerifyingKey::from_bytes(&signer)
            .map_err(|_| RequestError::InvalidSigner(IdentifierError::InvalidPublicKey))?;
        let signature = Signature::from_bytes(self.signature.as_bytes());
        key.verify(self.request_hash.as_bytes(), &signature)
            .map_err(|_| RequestError::InvalidSignature)
    }

    /// Re-derive the hash and check the signature, as a router does before
    /// serving the request.
    pub fn verify<H: RequestHasher>(&self, hasher: &H) -> Result<(), RequestError> {
        self.verify_hash(hasher)?;
        self.verify_signature()
    }
}

/// Build a [`SignedRequest`] with the default hasher and the current time.
///
/// See [`build_signed_request_with`].
pub async fn build_signed_request<W: WalletIdentity>(
    input: &GenerateInput,
    wallet: &W,
    program_id: &str,
) -> Result<SignedRequest, RequestError> {
    let now = Utc::now().timestamp_millis();
    build_signed_request_with(input, wallet, program_id, &Sha256Hasher, now).await
}

/// Build a [`SignedRequest`].
///
/// Validates the input, checks the wallet's public key, canonicalizes and
/// hashes the payload, then asks the wallet to sign the raw digest. Nothing
/// is signed unless every earlier step succeeded. `now_millis` is used when
/// the input carries no timestamp.
///
/// The wallet's signing future is awaited to completion. Callers that drop
/// this future while the wallet is signing only cancel up to the wallet
/// boundary.
pub async fn build_signed_request_with<W, H>(
    input: &GenerateInput,
    wallet: &W,
    program_id: &str,
    hasher: &H,
    now_millis: i64,
) -> Result<SignedRequest, RequestError>
where
    W: WalletIdentity,
    H: RequestHasher,
{
    let input = input.validate(now_millis)?;

    let signer = wallet.public_key_id();
    decode_public_key_id(signer).map_err(RequestError::InvalidSigner)?;

    let request = HashableRequest {
        program_id: program_id.to_owned(),
        model: input.model,
        prompt: input.prompt,
        temperature: input.temperature,
        max_tokens: input.max_tokens,
        timestamp: input.timestamp,
        signer: signer.to_owned(),
    };
    let request_hash = request.request_hash(hasher)?;

    let signature =
        wallet.sign(request_hash.as_bytes()).await.map_err(RequestError::SigningFailed)?;
    let signature = RequestSignature::try_from(signature.as_slice())
        .map_err(|_| RequestError::InvalidSignatureLength { len: signature.len() })?;

    Ok(SignedRequest { request, request_hash, signature })
}
