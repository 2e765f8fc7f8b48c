use core::{future::Future, time::Duration};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

/// Errors returned while delivering a request to the router.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// No response arrived within the configured timeout.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed.
        after: Duration,
    },
    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,
    /// The network call failed before a response was received.
    #[error("network failure: {0}")]
    NetworkFailure(#[source] Box<dyn core::error::Error + Send + Sync>),
    /// The router answered with a non-2xx status.
    #[error("router returned {status} {status_text}: {body_text}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status, if any.
        status_text: String,
        /// The raw response body, lossily decoded as UTF-8.
        body_text: String,
    },
    /// The router answered with a successful status and an empty body.
    #[error("router returned an empty response")]
    EmptyResponse,
    /// The router answered with a body that is not JSON.
    #[error("router returned malformed JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    /// The request body could not be serialized.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl TransportError {
    /// Wrap an underlying network fault.
    pub fn network(err: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        Self::NetworkFailure(err.into())
    }

    /// True if the same request may succeed when sent again. The client
    /// itself never retries.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkFailure(_) => true,
            Self::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err)
    }
}

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status. May be empty.
    pub status_text: String,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_owned();
        Self { status, status_text, body: body.into() }
    }

    /// True for 2xx statuses.
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The network call used to deliver JSON bodies.
///
/// Implementations only move bytes. Timeouts, cancellation and response
/// classification are applied by [`post_json`], so a custom transport gets
/// them for free. Faults that happen before a response arrives should be
/// reported as [`TransportError::NetworkFailure`].
pub trait HttpTransport {
    /// POST `body` as `application/json` to `url`.
    fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).post(url, body)
    }
}

/// The default [`HttpTransport`], backed by [`reqwest`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a new reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with the given client.
    pub const fn new_with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get the client used to send requests.
    pub const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(
        &self,
        url: &Url,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);

        async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body: body.to_vec(),
            })
        }
    }
}

/// Per-call transport options.
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    /// Abort the call with [`TransportError::Timeout`] after this long.
    pub timeout: Option<Duration>,
    /// Abort the call with [`TransportError::Cancelled`] when this token is
    /// cancelled. Cancellation wins over a timeout that elapses at the same
    /// time.
    pub cancel: Option<CancellationToken>,
}

impl PostOptions {
    /// Set the timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// POST a JSON body and parse the JSON response.
///
/// The body is serialized with `serde_json`; the router only needs valid
/// JSON, since integrity comes from the request hash and signature. The call
/// races the transport against the cancellation token and the timeout. The
/// timer and the cancellation wait live only for the duration of this call
/// and are dropped on every exit path.
///
/// Responses are classified as follows:
/// - non-2xx status: [`TransportError::HttpError`] with the raw body
/// - empty or whitespace-only body: [`TransportError::EmptyResponse`]
/// - body that is not JSON: [`TransportError::MalformedResponse`]
#[instrument(skip_all, fields(%url))]
pub async fn post_json<T, B>(
    transport: &T,
    url: &Url,
    body: &B,
    options: &PostOptions,
) -> Result<Value, TransportError>
where
    T: HttpTransport + ?Sized,
    B: Serialize + ?Sized,
{
    let body = serde_json::to_vec(body).map_err(TransportError::Serialize)?;

    if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
        return Err(TransportError::Cancelled);
    }

    let cancelled = async {
        match &options.cancel {
            Some(token) => token.cancelled().await,
            None => core::future::pending().await,
        }
    };
    let timer = async {
        match options.timeout {
            Some(after) => {
                tokio::time::sleep(after).await;
                after
            }
            None => core::future::pending().await,
        }
    };

    let response = tokio::select! {
        biased;
        _ = cancelled => return Err(TransportError::Cancelled),
        response = transport.post(url, body) => response?,
        after = timer => return Err(TransportError::Timeout { after }),
    };

    debug!(status = response.status, bytes = response.body.len(), "router responded");

    if !response.is_success() {
        return Err(TransportError::HttpError {
            status: response.status,
            status_text: response.status_text,
            body_text: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Err(TransportError::EmptyResponse);
    }

    serde_json::from_slice(&response.body).map_err(TransportError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Returns a fixed response and records request bodies.
    #[derive(Debug, Clone, Default)]
    struct Canned {
        response: Option<HttpResponse>,
        bodies: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self { response: Some(HttpResponse::new(status, body)), ..Default::default() }
        }

        /// A transport that never answers.
        fn hanging() -> Self {
            Self::default()
        }
    }

    impl HttpTransport for Canned {
        fn post(
            &self,
            _url: &Url,
            body: Vec<u8>,
        ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
            self.bodies.lock().unwrap().push(body);
            let response = self.response.clone();
            async move {
                match response {
                    Some(response) => Ok(response),
                    None => core::future::pending().await,
                }
            }
        }
    }

    fn url() -> Url {
        "http://router.test/generate".parse().unwrap()
    }

    #[tokio::test]
    async fn parses_json_responses() {
        let transport = Canned::new(200, r#"{"ok":true}"#);
        let value =
            post_json(&transport, &url(), &json!({"b": 1, "a": 2}), &PostOptions::default())
                .await
                .unwrap();
        assert_eq!(value, json!({"ok": true}));

        let sent = transport.bodies.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        let sent: Value = serde_json::from_slice(&sent[0]).unwrap();
        assert_eq!(sent, json!({"a": 2, "b": 1}));
    }

    #[tokio::test]
    async fn classifies_failures() {
        let options = PostOptions::default();

        let err = post_json(&Canned::new(500, "oops"), &url(), &(), &options).await.unwrap_err();
        match err {
            TransportError::HttpError { status, status_text, body_text } => {
                assert_eq!(status, 500);
                assert_eq!(status_text, "Internal Server Error");
                assert_eq!(body_text, "oops");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = post_json(&Canned::new(200, ""), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::EmptyResponse));

        let err = post_json(&Canned::new(200, " \n"), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::EmptyResponse));

        let err = post_json(&Canned::new(200, "<html>"), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedResponse(_)));

        // a 404 with an empty body is still an http error
        let err = post_json(&Canned::new(404, ""), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::HttpError { status: 404, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out() {
        let options = PostOptions::default().with_timeout(Duration::from_millis(10));
        let started = tokio::time::Instant::now();
        let err = post_json(&Canned::hanging(), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Timeout { after } if after == Duration::from_millis(10)
        ));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(10) && elapsed < Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_aborts_the_wait() {
        let token = CancellationToken::new();
        let options = PostOptions::default()
            .with_timeout(Duration::from_secs(60))
            .with_cancel(token.clone());

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                token.cancel();
            })
        };

        let err = post_json(&Canned::hanging(), &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn already_cancelled_sends_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        let transport = Canned::new(200, "{}");
        let options = PostOptions::default().with_cancel(token);

        let err = post_json(&transport, &url(), &(), &options).await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
        assert!(transport.bodies.lock().unwrap().is_empty());
    }

    #[test]
    fn retryable_errors() {
        assert!(TransportError::Timeout { after: Duration::ZERO }.is_retryable());
        assert!(TransportError::network("reset").is_retryable());
        let http = |status| TransportError::HttpError {
            status,
            status_text: String::new(),
            body_text: String::new(),
        };
        assert!(http(503).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(!TransportError::Cancelled.is_retryable());
        assert!(!TransportError::EmptyResponse.is_retryable());
    }
}
