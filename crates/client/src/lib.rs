//! Snowy inference client.
//!
//! Sends wallet-signed generation requests to a Snowy router and only
//! returns responses that are bound to exactly the request that was sent.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use snowy_client::{ClientConfig, SnowyClient};
//! use snowy_constants::KnownNetworks;
//! use snowy_types::{GenerateInput, LocalWallet};
//!
//! let endpoint: url::Url = "https://router.example/generate".parse()?;
//! let config = ClientConfig::new(KnownNetworks::Devnet, endpoint);
//! let client = SnowyClient::new(LocalWallet::random(), config)?;
//! let response = client.generate(&GenerateInput::new("snowy-base", "hello")).await?;
//! println!("{}", response.output);
//! # Ok(())
//! # }
//! ```
//!
//! Each call suspends in two places: while the wallet signs and while the
//! router answers. Timeouts and cancellation apply to the router call only.
//! The client never retries; see [`GenerateError::is_retryable`].

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

mod client;
pub use client::SnowyClient;

/// Client configuration and environment loading.
pub mod config;
pub use config::{ClientConfig, ConfigError};

mod error;
pub use error::{ErrorCategory, ErrorKind, GenerateError};

mod transport;
pub use transport::{
    post_json, HttpResponse, HttpTransport, PostOptions, ReqwestTransport, TransportError,
};

pub use tokio_util::sync::CancellationToken;
