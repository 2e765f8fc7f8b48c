mod env_utils;
pub use env_utils::{load_string, load_string_opt, load_u64_opt, load_url};

mod error;
pub use error::ConfigError;

use core::time::Duration;
use snowy_constants::{KnownNetworks, SnowyConstants};
use snowy_types::decode_base58_array;
use url::Url;

/// Environment variable naming the network.
pub const NETWORK_ENV: &str = "SNOWY_NETWORK";
/// Environment variable holding the router endpoint URL.
pub const ENDPOINT_ENV: &str = "SNOWY_ENDPOINT";
/// Environment variable overriding the program identifier.
pub const PROGRAM_ID_ENV: &str = "SNOWY_PROGRAM_ID";
/// Environment variable overriding the transport timeout, in milliseconds.
/// `0` disables the timeout.
pub const TIMEOUT_MS_ENV: &str = "SNOWY_TIMEOUT_MS";

/// Transport timeout applied unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`SnowyClient`].
///
/// [`SnowyClient`]: crate::SnowyClient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    network: KnownNetworks,
    endpoint: Url,
    program_id: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a config for `network` that sends requests to `endpoint`.
    ///
    /// The program identifier defaults to the network's well-known program
    /// and the timeout to [`DEFAULT_TIMEOUT`].
    pub fn new(network: KnownNetworks, endpoint: Url) -> Self {
        Self {
            network,
            endpoint,
            program_id: network.constants().program_id().to_owned(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Load the config from the environment.
    ///
    /// Reads [`NETWORK_ENV`] and [`ENDPOINT_ENV`], which are required, and
    /// the optional [`PROGRAM_ID_ENV`] and [`TIMEOUT_MS_ENV`]. The result is
    /// validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let network = load_string(NETWORK_ENV)?.parse::<KnownNetworks>()?;
        let endpoint = load_url(ENDPOINT_ENV)?;

        let mut config = Self::new(network, endpoint);
        if let Some(program_id) = load_string_opt(PROGRAM_ID_ENV) {
            config = config.with_program_id(program_id);
        }
        match load_u64_opt(TIMEOUT_MS_ENV)? {
            Some(0) => config = config.without_timeout(),
            Some(ms) => config = config.with_timeout(Duration::from_millis(ms)),
            None => {}
        }

        config.validate()?;
        Ok(config)
    }

    /// Bind requests to a different program.
    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = program_id.into();
        self
    }

    /// Send requests to a different endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the transport timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the transport timeout.
    pub const fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Check the config.
    ///
    /// - the program identifier decodes to 32 bytes
    /// - the endpoint is an http or https URL
    /// - the timeout, if any, is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        decode_base58_array::<32>(&self.program_id).map_err(ConfigError::InvalidProgramId)?;

        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(self.endpoint.scheme().to_owned()));
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }

    /// Get the network.
    pub const fn network(&self) -> KnownNetworks {
        self.network
    }

    /// Get the constants of the configured network.
    pub const fn constants(&self) -> SnowyConstants {
        self.network.constants()
    }

    /// Get the router endpoint.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the program identifier requests are bound to.
    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Get the transport timeout.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowy_constants::SNOWY_PROGRAM_ID;

    fn endpoint() -> Url {
        "https://router.snowy.test/v1/generate".parse().unwrap()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::new(KnownNetworks::Devnet, endpoint());
        assert_eq!(config.program_id(), SNOWY_PROGRAM_ID);
        assert_eq!(config.timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(config.constants(), SnowyConstants::devnet());
        config.validate().unwrap();
    }

    #[test]
    fn validation() {
        let config = ClientConfig::new(KnownNetworks::Localnet, endpoint());

        let err = config.clone().with_program_id("not-base58!").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProgramId(_)));

        let err = config.clone().with_program_id("1111").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProgramId(_)));

        let ws = "ws://router.snowy.test".parse().unwrap();
        let err = config.clone().with_endpoint(ws).validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(s) if s == "ws"));

        let err = config.clone().with_timeout(Duration::ZERO).validate().unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));

        config.without_timeout().validate().unwrap();
    }

    // The only test that touches these variables.
    #[test]
    fn loads_from_env() {
        std::env::remove_var(NETWORK_ENV);
        assert!(matches!(ClientConfig::from_env(), Err(ConfigError::Var(v)) if v == NETWORK_ENV));

        std::env::set_var(NETWORK_ENV, "Mainnet");
        std::env::set_var(ENDPOINT_ENV, "http://127.0.0.1:8080/generate");
        std::env::set_var(TIMEOUT_MS_ENV, "250");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.network(), KnownNetworks::MainnetBeta);
        assert_eq!(config.endpoint().port(), Some(8080));
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));

        std::env::set_var(TIMEOUT_MS_ENV, "0");
        assert_eq!(ClientConfig::from_env().unwrap().timeout(), None);

        std::env::set_var(TIMEOUT_MS_ENV, "soon");
        assert!(matches!(ClientConfig::from_env(), Err(ConfigError::Parse(_))));
        std::env::remove_var(TIMEOUT_MS_ENV);

        std::env::set_var(NETWORK_ENV, "testnet-x");
        assert!(matches!(ClientConfig::from_env(), Err(ConfigError::Network(_))));

        for key in [NETWORK_ENV, ENDPOINT_ENV] {
            std::env::remove_var(key);
        }
    }
}
