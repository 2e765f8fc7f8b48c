//! An in-process mock of the Snowy router.
//!
//! [`MockRouter`] serves `POST /generate` on an ephemeral localhost port. In
//! [`RouterMode::Verify`] it does what a real router does before serving a
//! request: re-derive the hash and check the signature. The other modes
//! misbehave in one specific way each.

use crate::users::{TEST_SIGNER_0, TEST_SIGNER_1};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use snowy_client::ClientConfig;
use snowy_constants::KnownNetworks;
use snowy_types::{
    sha256_base58, GenerateResponse, Sha256Hasher, SignedRequest, Usage, Verification,
};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Path the mock router serves.
pub const GENERATE_PATH: &str = "/generate";

/// Program identifier echoed by [`RouterMode::WrongProgramId`].
pub const OTHER_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// How the mock router answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterMode {
    /// Verify the request and answer with a correctly bound response.
    Verify,
    /// Answer with this status code and body text.
    Status(u16, String),
    /// Never answer.
    Hang,
    /// Answer 200 with an empty body.
    Empty,
    /// Answer 200 with a body that is not JSON.
    Malformed,
    /// Echo a different signer.
    WrongSigner,
    /// Echo a different request hash.
    WrongHash,
    /// Echo a different program identifier.
    WrongProgramId,
    /// Omit `usage` from the response.
    MissingUsage,
}

#[derive(Debug, Clone)]
struct RouterState {
    mode: RouterMode,
    received: Arc<Mutex<Vec<Value>>>,
}

/// A running mock router. Dropping it shuts the server down.
#[derive(Debug)]
pub struct MockRouter {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
    shutdown: CancellationToken,
}

impl MockRouter {
    /// Bind `127.0.0.1:0` and serve in `mode` on a background task.
    pub async fn spawn(mode: RouterMode) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let received = Arc::new(Mutex::new(Vec::new()));
        let state = RouterState { mode, received: received.clone() };
        let app = Router::new().route(GENERATE_PATH, post(generate)).with_state(state);

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(signal).await {
                warn!(%e, "Mock router stopped");
            }
        });

        debug!(%addr, "Mock router listening");
        Ok(Self { addr, received, shutdown })
    }

    /// The socket address the router listens on.
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The URL of the generate endpoint.
    pub fn endpoint(&self) -> Url {
        format!("http://{}{GENERATE_PATH}", self.addr).parse().unwrap()
    }

    /// A client config for the test network pointed at this router.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(KnownNetworks::Test, self.endpoint())
    }

    /// Every request body received so far, in arrival order. Bodies that are
    /// not JSON are recorded as `null`.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for MockRouter {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn generate(State(state): State<RouterState>, body: Bytes) -> Response {
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.received.lock().unwrap().push(value.clone());

    match &state.mode {
        RouterMode::Status(status, text) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, text.clone()).into_response();
        }
        RouterMode::Hang => return std::future::pending().await,
        RouterMode::Empty => return StatusCode::OK.into_response(),
        RouterMode::Malformed => return (StatusCode::OK, "<html>snowed in</html>").into_response(),
        _ => {}
    }

    let request: SignedRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    if let Err(e) = request.verify(&Sha256Hasher) {
        return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
    }

    let mut verification = Verification {
        request_hash: request.request_hash().to_base58(),
        signer: request.signer().to_owned(),
        program_id: request.program_id().to_owned(),
    };
    match state.mode {
        RouterMode::WrongSigner => {
            verification.signer = if request.signer() == TEST_SIGNER_1 {
                TEST_SIGNER_0.to_owned()
            } else {
                TEST_SIGNER_1.to_owned()
            };
        }
        RouterMode::WrongHash => verification.request_hash = sha256_base58(b"another request"),
        RouterMode::WrongProgramId => verification.program_id = OTHER_PROGRAM_ID.to_owned(),
        _ => {}
    }

    let hashable = request.hashable();
    let output = format!("echo: {}", hashable.prompt());
    let prompt_tokens = hashable.prompt().split_whitespace().count() as u64;
    let completion_tokens = output.split_whitespace().count() as u64;
    let response = GenerateResponse {
        output,
        model: hashable.model(),
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
        verification,
    };

    let mut body = match serde_json::to_value(&response) {
        Ok(body) => body,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };
    if state.mode == RouterMode::MissingUsage {
        if let Some(obj) = body.as_object_mut() {
            obj.remove("usage");
        }
    }
    Json(body).into_response()
}
