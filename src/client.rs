use std::sync::Arc;
use std::time::Instant;

use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;

use crate::config::{ConfigError, RelayConfig};
use crate::oauth::{AuthorizationHeader, SignableRequest, Signer, SigningError};
use crate::observe::{RelayObserver, TracingObserver};
use crate::restlet::RestletEndpoint;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Why a lead did not make it through to a successful RESTlet response.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("failed to sign request: {0}")]
    Signing(#[from] SigningError),
    #[error("request to NetSuite failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("NetSuite error: {code} - {body}", code = .status.as_u16())]
    Upstream { status: StatusCode, body: String },
    #[error("NetSuite returned invalid JSON: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

/// Signs lead payloads and POSTs them to one RESTlet deployment.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct RestletClient {
    http: Client,
    signer: Signer,
    endpoint: RestletEndpoint,
    observer: Arc<dyn RelayObserver>,
}

impl RestletClient {
    pub fn new(config: &RelayConfig) -> Result<Self, ClientError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        config: &RelayConfig,
        observer: Arc<dyn RelayObserver>,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self {
            http,
            signer: config.signer(),
            endpoint: config.endpoint()?,
            observer,
        })
    }

    pub fn endpoint(&self) -> &RestletEndpoint {
        &self.endpoint
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// A fresh Authorization header for `POST` to the endpoint.
    pub fn authorize(&self) -> Result<AuthorizationHeader, SigningError> {
        self.signer.sign(&SignableRequest::new(Method::POST, self.endpoint.url()))
    }

    /// Forward the raw `payload` bytes unchanged and return the RESTlet's JSON response.
    ///
    /// Not retried: a failed call surfaces immediately.
    pub async fn submit(&self, payload: &[u8]) -> Result<Value, ForwardError> {
        let result = self.forward(payload).await;
        if let Err(ref error) = result {
            self.observer.failed(error);
        }
        result
    }

    async fn forward(&self, payload: &[u8]) -> Result<Value, ForwardError> {
        let started = Instant::now();
        let url = self.endpoint.url();

        let authorization = self.authorize()?;
        self.observer.forwarding(url, self.signer.method(), payload.len());

        let response = self
            .http
            .post(url.clone())
            .header(header::AUTHORIZATION, authorization.to_header_value()?)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        self.observer.upstream_responded(status, started.elapsed());

        let text = response.text().await.map_err(ForwardError::Transport)?;
        if !status.is_success() {
            return Err(ForwardError::Upstream { status, body: text });
        }

        let json = serde_json::from_str(&text).map_err(ForwardError::InvalidResponse)?;
        self.observer.relayed(started.elapsed());
        Ok(json)
    }
}
