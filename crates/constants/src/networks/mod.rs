/// Solana devnet constants.
pub mod devnet;

/// Local validator constants.
pub mod localnet;

/// Solana mainnet-beta constants.
pub mod mainnet;

/// Test utilities for networks.
pub mod test_utils;
