use snowy_constants::ParseNetworkError;
use snowy_types::IdentifierError;

/// Errors loading or validating a [`ClientConfig`].
///
/// [`ClientConfig`]: crate::ClientConfig
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Error loading from environment variable
    #[error("missing or non-unicode environment variable: {0}")]
    Var(String),
    /// Error parsing integer environment variable
    #[error("failed to parse environment variable: {0}")]
    Parse(#[from] std::num::ParseIntError),
    /// Unknown network name.
    #[error(transparent)]
    Network(#[from] ParseNetworkError),
    /// The endpoint is not a valid URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    /// The endpoint is not an http or https URL.
    #[error("unsupported endpoint scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),
    /// The program identifier is not a 32 byte base58 key.
    #[error("invalid program id: {0}")]
    InvalidProgramId(#[source] IdentifierError),
    /// A zero timeout would fail every request.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

impl ConfigError {
    /// Missing or non-unicode env var.
    pub fn missing(s: &str) -> Self {
        ConfigError::Var(s.to_string())
    }
}
