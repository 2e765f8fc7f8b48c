mod networks;
pub use networks::{KnownNetworks, ParseNetworkError};

/// Snowy constants.
///
/// This struct contains the per-network constants of the Snowy protocol:
/// which network requests are anchored on, the cluster endpoint used to
/// submit attestations, and the program identifier every request hash is
/// bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnowyConstants {
    /// The network.
    network: KnownNetworks,
    /// JSON-RPC endpoint of the cluster.
    cluster_url: &'static str,
    /// Base58 program identifier.
    program_id: &'static str,
}

impl SnowyConstants {
    /// Create a new set of constants.
    pub const fn new(
        network: KnownNetworks,
        cluster_url: &'static str,
        program_id: &'static str,
    ) -> Self {
        Self { network, cluster_url, program_id }
    }

    /// Get the hard-coded devnet constants.
    pub const fn devnet() -> Self {
        crate::networks::devnet::DEVNET
    }

    /// Get the hard-coded mainnet-beta constants.
    pub const fn mainnet_beta() -> Self {
        crate::networks::mainnet::MAINNET
    }

    /// Get the hard-coded local validator constants.
    pub const fn localnet() -> Self {
        crate::networks::localnet::LOCALNET
    }

    /// Get the hard-coded test constants.
    #[cfg(any(test, feature = "test-utils"))]
    pub const fn test() -> Self {
        crate::networks::test_utils::TEST
    }

    /// Get the network.
    pub const fn network(&self) -> KnownNetworks {
        self.network
    }

    /// Get the cluster JSON-RPC endpoint.
    pub const fn cluster_url(&self) -> &'static str {
        self.cluster_url
    }

    /// Get the base58 program identifier.
    pub const fn program_id(&self) -> &'static str {
        self.program_id
    }
}
