use crate::SnowyConstants;
use std::{fmt, str::FromStr};

/// The list of known networks as a string.
const KNOWN_NETWORKS: &str = "devnet, mainnet-beta, localnet";

/// Error type for parsing a network from its name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNetworkError {
    /// The network name is not supported.
    #[error("network name {0} is not parseable. supported networks: {KNOWN_NETWORKS}")]
    NetworkNotSupported(String),
}

/// Known networks for the Snowy protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnownNetworks {
    /// Solana devnet.
    Devnet,
    /// Solana mainnet-beta.
    MainnetBeta,
    /// A local validator.
    Localnet,
    /// Test network.
    #[cfg(any(test, feature = "test-utils"))]
    Test,
}

impl KnownNetworks {
    /// The canonical name of the network.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Devnet => crate::devnet::NAME,
            Self::MainnetBeta => crate::mainnet::NAME,
            Self::Localnet => crate::localnet::NAME,
            #[cfg(any(test, feature = "test-utils"))]
            Self::Test => crate::test_utils::NAME,
        }
    }

    /// Get the hard-coded constants for the network.
    pub const fn constants(&self) -> SnowyConstants {
        match self {
            Self::Devnet => crate::devnet::DEVNET,
            Self::MainnetBeta => crate::mainnet::MAINNET,
            Self::Localnet => crate::localnet::LOCALNET,
            #[cfg(any(test, feature = "test-utils"))]
            Self::Test => crate::test_utils::TEST,
        }
    }
}

impl fmt::Display for KnownNetworks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KnownNetworks {
    type Err = ParseNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            #[cfg(any(test, feature = "test-utils"))]
            "test" => Ok(Self::Test),
            "devnet" => Ok(Self::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Self::MainnetBeta),
            "localnet" | "localhost" => Ok(Self::Localnet),
            _ => Err(ParseNetworkError::NetworkNotSupported(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_networks() {
        assert_eq!("devnet".parse::<KnownNetworks>().unwrap(), KnownNetworks::Devnet);
        assert_eq!(" Mainnet-Beta ".parse::<KnownNetworks>().unwrap(), KnownNetworks::MainnetBeta);
        assert_eq!("mainnet".parse::<KnownNetworks>().unwrap(), KnownNetworks::MainnetBeta);
        assert_eq!("localnet".parse::<KnownNetworks>().unwrap(), KnownNetworks::Localnet);
        assert_eq!("test".parse::<KnownNetworks>().unwrap(), KnownNetworks::Test);
    }

    #[test]
    fn parse_unknown_network() {
        let err = "testnet".parse::<KnownNetworks>().unwrap_err();
        assert_eq!(err, ParseNetworkError::NetworkNotSupported("testnet".to_string()));
        assert!(err.to_string().contains("devnet, mainnet-beta, localnet"));
    }

    #[test]
    fn display_round_trips() {
        for network in [KnownNetworks::Devnet, KnownNetworks::MainnetBeta, KnownNetworks::Localnet]
        {
            assert_eq!(network.to_string().parse::<KnownNetworks>().unwrap(), network);
            assert_eq!(network.constants().network(), network);
        }
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&KnownNetworks::MainnetBeta).unwrap();
        assert_eq!(json, "\"mainnet-beta\"");
    }
}
