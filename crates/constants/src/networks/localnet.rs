//! Constants for a local validator.

use crate::{KnownNetworks, SnowyConstants, SNOWY_PROGRAM_ID};

/// Name of the network.
pub const NAME: &str = "localnet";
/// JSON-RPC endpoint of a default `solana-test-validator`.
pub const CLUSTER_URL: &str = "http://127.0.0.1:8899";
/// Program identifier deployed on the local validator.
pub const PROGRAM_ID: &str = SNOWY_PROGRAM_ID;

/// Snowy constants for a local validator.
pub const LOCALNET: SnowyConstants =
    SnowyConstants::new(KnownNetworks::Localnet, CLUSTER_URL, PROGRAM_ID);
