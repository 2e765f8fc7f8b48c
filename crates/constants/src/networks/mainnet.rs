//! Constants for Solana mainnet-beta.

use crate::{KnownNetworks, SnowyConstants, SNOWY_PROGRAM_ID};

/// Name of the network.
pub const NAME: &str = "mainnet-beta";
/// Public JSON-RPC endpoint of the mainnet-beta cluster.
pub const CLUSTER_URL: &str = "https://api.mainnet-beta.solana.com";
/// Program identifier deployed on mainnet-beta.
pub const PROGRAM_ID: &str = SNOWY_PROGRAM_ID;

/// Snowy constants for mainnet-beta.
pub const MAINNET: SnowyConstants =
    SnowyConstants::new(KnownNetworks::MainnetBeta, CLUSTER_URL, PROGRAM_ID);
