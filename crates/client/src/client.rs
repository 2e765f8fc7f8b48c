use crate::{
    post_json, ClientConfig, ConfigError, GenerateError, HttpTransport, PostOptions,
    ReqwestTransport,
};
use chrono::Utc;
use snowy_types::{
    build_signed_request_with, verify_response, GenerateInput, GenerateResponse, RequestError,
    RequestHasher, Sha256Hasher, SignedRequest, WalletIdentity,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Sends wallet-signed inference requests to a router and verifies the
/// responses.
///
/// `SnowyClient` is generic over:
/// - `W`: the [`WalletIdentity`] that signs requests
/// - `T`: the [`HttpTransport`] that delivers them
/// - `D`: the [`RequestHasher`] that digests them
///
/// The client holds no per-call state. Concurrent calls share nothing but
/// the configuration and the wallet, transport and hasher references.
#[derive(Debug, Clone)]
pub struct SnowyClient<W, T = ReqwestTransport, D = Sha256Hasher> {
    wallet: W,
    transport: T,
    hasher: D,
    config: ClientConfig,
}

impl<W> SnowyClient<W> {
    /// Create a client with the default reqwest transport and SHA-256.
    ///
    /// Fails if the config is invalid.
    pub fn new(wallet: W, config: ClientConfig) -> Result<Self, ConfigError> {
        Self::new_with_parts(wallet, ReqwestTransport::new(), Sha256Hasher, config)
    }
}

impl<W, T, D> SnowyClient<W, T, D> {
    /// Create a client from its parts.
    ///
    /// Fails if the config is invalid.
    pub fn new_with_parts(
        wallet: W,
        transport: T,
        hasher: D,
        config: ClientConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { wallet, transport, hasher, config })
    }

    /// Get a reference to the wallet.
    pub const fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Get a reference to the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a reference to the hasher.
    pub const fn hasher(&self) -> &D {
        &self.hasher
    }

    /// Get a reference to the config.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl<W, T, D> SnowyClient<W, T, D>
where
    W: WalletIdentity + Sync,
    T: HttpTransport + Sync,
    D: RequestHasher + Sync,
{
    /// Build and sign a request without sending it.
    #[instrument(skip_all, fields(model = %input.model))]
    pub async fn sign_request(&self, input: &GenerateInput) -> Result<SignedRequest, RequestError> {
        let request = build_signed_request_with(
            input,
            &self.wallet,
            self.config.program_id(),
            &self.hasher,
            Utc::now().timestamp_millis(),
        )
        .await
        .inspect_err(|e| warn!(%e, "Failed to build signed request"))?;

        debug!(request_hash = %request.request_hash(), signer = request.signer(), "Signed request");
        Ok(request)
    }

    /// Sign `input`, send it to the router and verify the response.
    ///
    /// Returns the response only if it echoes the request hash, signer and
    /// program identifier that were sent.
    pub async fn generate(&self, input: &GenerateInput) -> Result<GenerateResponse, GenerateError> {
        self.generate_inner(input, None).await
    }

    /// [`generate`] with a cancellation token.
    ///
    /// Cancellation aborts the wait for the router. It does not interrupt a
    /// wallet that is already signing: the signature is awaited, then the
    /// call fails with [`TransportError::Cancelled`] before anything is sent.
    ///
    /// [`generate`]: Self::generate
    /// [`TransportError::Cancelled`]: crate::TransportError::Cancelled
    pub async fn generate_with_cancel(
        &self,
        input: &GenerateInput,
        cancel: CancellationToken,
    ) -> Result<GenerateResponse, GenerateError> {
        self.generate_inner(input, Some(cancel)).await
    }

    /// Send an already signed request and verify the response.
    pub async fn send_request(
        &self,
        request: &SignedRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        self.send_inner(request, None).await
    }

    async fn generate_inner(
        &self,
        input: &GenerateInput,
        cancel: Option<CancellationToken>,
    ) -> Result<GenerateResponse, GenerateError> {
        let request = self.sign_request(input).await?;
        self.send_inner(&request, cancel).await
    }

    #[instrument(
        skip_all,
        fields(request_hash = %request.request_hash(), endpoint = %self.config.endpoint())
    )]
    async fn send_inner(
        &self,
        request: &SignedRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<GenerateResponse, GenerateError> {
        let options = PostOptions { timeout: self.config.timeout(), cancel };
        let body = post_json(&self.transport, self.config.endpoint(), request, &options)
            .await
            .inspect_err(|e| warn!(%e, "Failed to call router"))?;

        let response = verify_response(&body, request)
            .inspect_err(|e| warn!(%e, "Rejected router response"))?;

        debug!(
            total_tokens = response.usage.total_tokens,
            model = %response.model,
            "Verified router response"
        );
        Ok(response)
    }
}
