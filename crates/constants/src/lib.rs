//! Snowy system constants.
//!
//! This crate contains the constants shared by every participant in the
//! Snowy inference protocol: the well-known program identifier, the
//! supported networks and their cluster endpoints, the model names the
//! router understands, and the fixed sizes of keys, digests and signatures.
//!

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod networks;
pub use networks::devnet;
pub use networks::localnet;
pub use networks::mainnet;
pub use networks::test_utils;

mod types;
pub use types::{KnownNetworks, ParseNetworkError, SnowyConstants};

/// The default program (authority) identifier that requests are bound to.
///
/// Base58 encoding of a 32 byte key.
pub const SNOWY_PROGRAM_ID: &str = "Snowy1nference11111111111111111111111111111";

/// Model name for the general purpose model.
pub const MODEL_SNOWY_BASE: &str = "snowy-base";
/// Model name for the meme model.
pub const MODEL_SNOWY_MEME: &str = "snowy-meme";
/// Model name for the code model.
pub const MODEL_SNOWY_CODE: &str = "snowy-code";

/// Length in bytes of a wallet public key.
pub const PUBKEY_LEN: usize = 32;
/// Length in bytes of a request digest.
pub const DIGEST_LEN: usize = 32;
/// Length in bytes of a wallet signature.
pub const SIGNATURE_LEN: usize = 64;

/// Seed prefix of the on-chain inference record address.
pub const RECORD_SEED: &[u8] = b"snowy";

/// Default `temperature` applied when the caller does not set one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default `maxTokens` applied when the caller does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 256;
