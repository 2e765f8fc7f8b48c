//! Mock [`WalletIdentity`] implementations.

use core::{future::Future, time::Duration};
use snowy_constants::DIGEST_LEN;
use snowy_types::{LocalWallet, WalletError, WalletIdentity};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// How a [`MockWallet`] answers a signing request.
#[derive(Debug, Clone)]
pub enum SignBehavior {
    /// Sign with the wrapped wallet.
    Sign,
    /// Sign with the wrapped wallet, then truncate or zero-pad the signature
    /// to this many bytes.
    Resize(usize),
    /// Fail with this message.
    Fail(String),
    /// Sleep, then sign with the wrapped wallet.
    Delay(Duration),
}

/// A wallet that signs through a [`LocalWallet`] but can misbehave and
/// records every digest it was asked to sign.
#[derive(Debug, Clone)]
pub struct MockWallet {
    inner: LocalWallet,
    public_key_id: String,
    behavior: SignBehavior,
    calls: Arc<AtomicUsize>,
    digests: Arc<Mutex<Vec<[u8; DIGEST_LEN]>>>,
}

impl MockWallet {
    /// A well-behaved mock around `inner`.
    pub fn new(inner: LocalWallet) -> Self {
        let public_key_id = inner.public_key_id().to_owned();
        Self {
            inner,
            public_key_id,
            behavior: SignBehavior::Sign,
            calls: Default::default(),
            digests: Default::default(),
        }
    }

    /// A mock that returns signatures of `len` bytes.
    pub fn with_signature_len(inner: LocalWallet, len: usize) -> Self {
        Self::new(inner).with_behavior(SignBehavior::Resize(len))
    }

    /// A mock whose signing always fails.
    pub fn failing(inner: LocalWallet, message: impl Into<String>) -> Self {
        Self::new(inner).with_behavior(SignBehavior::Fail(message.into()))
    }

    /// A mock that takes `delay` to sign.
    pub fn slow(inner: LocalWallet, delay: Duration) -> Self {
        Self::new(inner).with_behavior(SignBehavior::Delay(delay))
    }

    /// Set the signing behavior.
    pub fn with_behavior(mut self, behavior: SignBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Report a different public key than the one that signs.
    pub fn with_public_key_id(mut self, public_key_id: impl Into<String>) -> Self {
        self.public_key_id = public_key_id.into();
        self
    }

    /// Number of times `sign` was called.
    pub fn sign_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Digests passed to `sign`, in call order.
    pub fn signed_digests(&self) -> Vec<[u8; DIGEST_LEN]> {
        self.digests.lock().unwrap().clone()
    }
}

impl WalletIdentity for MockWallet {
    fn public_key_id(&self) -> &str {
        &self.public_key_id
    }

    fn sign(
        &self,
        digest: &[u8; DIGEST_LEN],
    ) -> impl Future<Output = Result<Vec<u8>, WalletError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.digests.lock().unwrap().push(*digest);

        let signature = self.inner.sign_digest(digest).to_vec();
        let behavior = self.behavior.clone();
        async move {
            match behavior {
                SignBehavior::Sign => Ok(signature),
                SignBehavior::Resize(len) => {
                    let mut signature = signature;
                    signature.resize(len, 0);
                    Ok(signature)
                }
                SignBehavior::Fail(message) => Err(message.into()),
                SignBehavior::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(signature)
                }
            }
        }
    }
}
