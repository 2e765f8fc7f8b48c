use crate::{request::ModelKind, SignedRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors validating a router response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ResponseError {
    /// A required field is missing or has the wrong shape. `field` is the
    /// dotted wire path, e.g. `usage.totalTokens`.
    #[error("invalid response shape at `{field}`")]
    InvalidResponseShape {
        /// Dotted wire path of the offending field.
        field: &'static str,
    },
    /// The response echoes verification metadata that does not match the
    /// request that was sent.
    #[error("response `verification.{field}` mismatch: expected {expected}, got {actual}")]
    VerificationMismatch {
        /// Wire name of the mismatched field.
        field: &'static str,
        /// The value that was sent.
        expected: String,
        /// The value the router returned.
        actual: String,
    },
}

const fn shape(field: &'static str) -> ResponseError {
    ResponseError::InvalidResponseShape { field }
}

/// Token accounting reported by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated.
    pub completion_tokens: u64,
    /// Sum of both.
    pub total_tokens: u64,
}

/// The request binding metadata echoed back by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Base58 request hash the router re-derived.
    pub request_hash: String,
    /// Base58 public key of the signer.
    pub signer: String,
    /// Program identifier the request was bound to.
    pub program_id: String,
}

/// A router response that passed shape validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text.
    pub output: String,
    /// Model that served the request.
    pub model: ModelKind,
    /// Token accounting.
    pub usage: Usage,
    /// Request binding metadata.
    pub verification: Verification,
}

fn object<'a>(
    value: &'a Value,
    field: &'static str,
) -> Result<&'a Map<String, Value>, ResponseError> {
    value.as_object().ok_or(shape(field))
}

fn string(
    obj: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<String, ResponseError> {
    obj.get(key).and_then(Value::as_str).map(ToOwned::to_owned).ok_or(shape(field))
}

fn count(obj: &Map<String, Value>, key: &str, field: &'static str) -> Result<u64, ResponseError> {
    obj.get(key).and_then(Value::as_u64).ok_or(shape(field))
}

impl GenerateResponse {
    /// Validate the shape of a parsed response body.
    ///
    /// Fields are checked in wire order and the first bad one is reported.
    /// Unknown fields are ignored.
    pub fn from_json(value: &Value) -> Result<Self, ResponseError> {
        let root = object(value, "$")?;

        let output = string(root, "output", "output")?;
        let model = root
            .get("model")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<ModelKind>().ok())
            .ok_or(shape("model"))?;

        let usage = object(root.get("usage").unwrap_or(&Value::Null), "usage")?;
        let usage = Usage {
            prompt_tokens: count(usage, "promptTokens", "usage.promptTokens")?,
            completion_tokens: count(usage, "completionTokens", "usage.completionTokens")?,
            total_tokens: count(usage, "totalTokens", "usage.totalTokens")?,
        };

        let verification =
            object(root.get("verification").unwrap_or(&Value::Null), "verification")?;
        let verification = Verification {
            request_hash: string(verification, "requestHash", "verification.requestHash")?,
            signer: string(verification, "signer", "verification.signer")?,
            program_id: string(verification, "programId", "verification.programId")?,
        };

        Ok(Self { output, model, usage, verification })
    }

    /// Check that the verification metadata matches `request`.
    ///
    /// Compared in order `requestHash`, `signer`, `programId`.
    pub fn check_binding(&self, request: &SignedRequest) -> Result<(), ResponseError> {
        let expected_hash = request.request_hash().to_base58();
        let checks = [
            ("requestHash", expected_hash.as_str(), self.verification.request_hash.as_str()),
            ("signer", request.signer(), self.verification.signer.as_str()),
            ("programId", request.program_id(), self.verification.program_id.as_str()),
        ];

        for (field, expected, actual) in checks {
            if expected != actual {
                return Err(ResponseError::VerificationMismatch {
                    field,
                    expected: expected.to_owned(),
                    actual: actual.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Validate a parsed response body against the request it answers.
///
/// Returns the typed response only if its shape is valid and it echoes the
/// request hash, signer and program identifier that were sent.
pub fn verify_response(
    value: &Value,
    request: &SignedRequest,
) -> Result<GenerateResponse, ResponseError> {
    let response = GenerateResponse::from_json(value)?;
    response.check_binding(request)?;
    Ok(response)
}
