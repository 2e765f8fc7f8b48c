//! Deterministic test wallets.

use snowy_types::LocalWallet;
use std::sync::LazyLock;

/// Seeds of [`TEST_WALLETS`].
pub const TEST_SEEDS: [[u8; 32]; 2] = [[1u8; 32], [2u8; 32]];

/// Public key of `TEST_WALLETS[0]`.
pub const TEST_SIGNER_0: &str = "AKnL4NNf3DGWZJS6cPknBuEGnVsV4A4m5tgebLHaRSZ9";

/// Public key of `TEST_WALLETS[1]`.
pub const TEST_SIGNER_1: &str = "9hSR6S7WPtxmTojgo6GG3k4yDPecgJY292j7xrsUGWBu";

/// Wallets derived from [`TEST_SEEDS`].
pub static TEST_WALLETS: LazyLock<[LocalWallet; 2]> =
    LazyLock::new(|| TEST_SEEDS.map(|seed| LocalWallet::from_bytes(&seed)));
