use crate::TransportError;
use snowy_types::{CanonicalError, RequestError, ResponseError};

/// Errors returned by [`SnowyClient::generate`].
///
/// Every variant aborts the call. Use [`GenerateError::kind`] to branch on
/// the failure without matching nested enums.
///
/// [`SnowyClient::generate`]: crate::SnowyClient::generate
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// Building or signing the request failed. Nothing was sent.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Delivering the request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response is untrustworthy.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// A flat name for every way a call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A caller supplied field failed validation.
    InvalidInput,
    /// The wallet's public key is not a 32 byte base58 key.
    InvalidSigner,
    /// The payload contained a value with no canonical encoding.
    NonCanonicalValue,
    /// The payload contained a value shape that is not plain JSON.
    UnsupportedValue,
    /// The wallet returned a signature that is not 64 bytes.
    InvalidSignatureLength,
    /// The wallet failed to sign.
    SigningFailed,
    /// The router did not answer in time.
    Timeout,
    /// The caller cancelled the call.
    Cancelled,
    /// The network call failed.
    NetworkFailure,
    /// The router answered with a non-2xx status.
    HttpError,
    /// The router answered with an empty body.
    EmptyResponse,
    /// The router answered with a body that is not JSON.
    MalformedResponse,
    /// The response is missing fields or has the wrong shape.
    InvalidResponseShape,
    /// The response does not echo the request that was sent.
    VerificationMismatch,
    /// Any other failure, e.g. a request body that could not be serialized.
    Other,
}

/// Coarse grouping of [`ErrorKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The caller supplied something invalid. Nothing was sent.
    Input,
    /// The wallet misbehaved.
    Signing,
    /// The request could not be delivered.
    Transport,
    /// The response cannot be trusted.
    Integrity,
}

impl ErrorKind {
    /// The category of this kind, or `None` for [`ErrorKind::Other`].
    pub const fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::InvalidInput
            | Self::InvalidSigner
            | Self::NonCanonicalValue
            | Self::UnsupportedValue => Some(ErrorCategory::Input),
            Self::InvalidSignatureLength | Self::SigningFailed => Some(ErrorCategory::Signing),
            Self::Timeout | Self::Cancelled | Self::NetworkFailure | Self::HttpError => {
                Some(ErrorCategory::Transport)
            }
            Self::EmptyResponse
            | Self::MalformedResponse
            | Self::InvalidResponseShape
            | Self::VerificationMismatch => Some(ErrorCategory::Integrity),
            Self::Other => None,
        }
    }
}

impl GenerateError {
    /// The kind of failure.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Request(err) => match err {
                RequestError::InvalidInput { .. } => ErrorKind::InvalidInput,
                RequestError::InvalidSigner(_) => ErrorKind::InvalidSigner,
                RequestError::Canonical(err) if err.is_non_canonical() => {
                    ErrorKind::NonCanonicalValue
                }
                RequestError::Canonical(_) => ErrorKind::UnsupportedValue,
                RequestError::InvalidSignatureLength { .. } => ErrorKind::InvalidSignatureLength,
                RequestError::SigningFailed(_) => ErrorKind::SigningFailed,
                _ => ErrorKind::Other,
            },
            Self::Transport(err) => match err {
                TransportError::Timeout { .. } => ErrorKind::Timeout,
                TransportError::Cancelled => ErrorKind::Cancelled,
                TransportError::NetworkFailure(_) => ErrorKind::NetworkFailure,
                TransportError::HttpError { .. } => ErrorKind::HttpError,
                TransportError::EmptyResponse => ErrorKind::EmptyResponse,
                TransportError::MalformedResponse(_) => ErrorKind::MalformedResponse,
                _ => ErrorKind::Other,
            },
            Self::Response(err) => match err {
                ResponseError::InvalidResponseShape { .. } => ErrorKind::InvalidResponseShape,
                ResponseError::VerificationMismatch { .. } => ErrorKind::VerificationMismatch,
                _ => ErrorKind::Other,
            },
        }
    }

    /// True if the same input may succeed when sent again. The client itself
    /// never retries.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// The HTTP status, if the router answered with a non-2xx status.
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::HttpError { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<CanonicalError> for GenerateError {
    fn from(err: CanonicalError) -> Self {
        Self::Request(err.into())
    }
}
