//! Constants for Solana devnet.

use crate::{KnownNetworks, SnowyConstants, SNOWY_PROGRAM_ID};

/// Name of the network.
pub const NAME: &str = "devnet";
/// Public JSON-RPC endpoint of the devnet cluster.
pub const CLUSTER_URL: &str = "https://api.devnet.solana.com";
/// Program identifier deployed on devnet.
pub const PROGRAM_ID: &str = SNOWY_PROGRAM_ID;

/// Snowy constants for devnet.
pub const DEVNET: SnowyConstants =
    SnowyConstants::new(KnownNetworks::Devnet, CLUSTER_URL, PROGRAM_ID);
