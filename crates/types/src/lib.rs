//! Snowy protocol types.
//!
//! Everything needed to authorize an inference request with a wallet
//! signature and to check that a response answers exactly that request:
//!
//! - [`canonical`]: deterministic JSON encoding of any serializable value.
//! - [`RequestHasher`]: the injected digest provider, SHA-256 by default.
//! - [`WalletIdentity`]: the signing capability a wallet adapter provides.
//! - [`build_signed_request`]: validates input, hashes and signs it.
//! - [`verify_response`]: checks response shape and request binding.
//! - [`attestation`]: data builders for anchoring a request on chain.
//!
//! This crate performs no I/O.

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
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod attestation;
pub use attestation::{Attestation, AttestationError};

pub mod canonical;
pub use canonical::{to_canonical_string, to_canonical_vec, CanonicalError};

mod encoding;
pub use encoding::{decode_base58, decode_base58_array, encode_base58, IdentifierError};

mod hash;
pub use hash::{sha256, sha256_base58, RequestHash, RequestHasher, Sha256Hasher};

mod request;
pub use request::{
    build_signed_request, build_signed_request_with, GenerateInput, HashableRequest, ModelKind,
    ParseModelError, RequestError, SignedRequest,
};

mod response;
pub use response::{verify_response, GenerateResponse, ResponseError, Usage, Verification};

mod wallet;
pub use wallet::{decode_public_key_id, LocalWallet, RequestSignature, WalletError, WalletIdentity};
