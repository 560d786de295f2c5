//! HTTP gateway backed by `reqwest`.
//!
//! Resolves request paths against a base URL, forwards headers and JSON
//! bodies, and maps non-success responses to [`GatewayError::Rejected`]
//! using the backend's `{ "msg": ... }` error body when present.

use std::time::Duration;

use serde_json::Value;
use taskdesk_proto::task::MessageBody;
use url::Url;

use super::{FetchGateway, FetchRequest, GatewayError, Method};

/// REST gateway talking to a `TaskDesk` backend.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    /// Creates a gateway for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidUrl`] if `base_url` does not parse, or
    /// [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;
        // Paths are joined relative to the base, so it must end in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a request path (`/tasks/1`) against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl FetchGateway for HttpGateway {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, GatewayError> {
        let url = self.endpoint(&request.url)?;
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.data {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<MessageBody>(&bytes).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                },
                |body| body.msg,
            );
            tracing::warn!(method = %request.method, path = %request.url, status = status.as_u16(), %message, "request rejected");
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
