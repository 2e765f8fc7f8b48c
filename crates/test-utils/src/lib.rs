//! Test utilities for Snowy components.
//!
//! Deterministic wallets, misbehaving wallet mocks and an in-process mock
//! router that speaks the Snowy wire format.

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

pub mod mock;
pub mod router;
pub mod users;

pub use snowy_constants::test_utils as test_constants;

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Install a `warn` level test subscriber once per process. `RUST_LOG`
/// overrides the level.
pub fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}
