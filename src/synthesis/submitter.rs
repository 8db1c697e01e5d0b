//! Network exchange with the synthesis service.
//!
//! [`SynthesisTransport`] is the seam the orchestrator depends on;
//! [`HttpSubmitter`] is the `reqwest` implementation. All connection details
//! come from [`Endpoint`] and the client built by
//! [`ServiceConfig::http_client`](crate::config::ServiceConfig::http_client);
//! nothing is hardcoded.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use super::{EncodedPayload, Endpoint};

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Failures below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, ...
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Only possible when `service.timeout_secs` is configured.
    #[error("request timed out")]
    Timeout,

    /// The reply body could not be parsed as JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The multipart body could not be built.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else if e.is_builder() {
            TransportError::Encode(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RawResponse
// ---------------------------------------------------------------------------

/// Status and parsed JSON body, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }
}

// ---------------------------------------------------------------------------
// SynthesisTransport
// ---------------------------------------------------------------------------

/// Sends one synthesis request and waits for the complete reply.
///
/// Implementations do not retry and do not touch submission state.
/// Must be `Send + Sync` so it can sit behind `Arc<dyn SynthesisTransport>`.
#[async_trait]
pub trait SynthesisTransport: Send + Sync {
    async fn submit(&self, payload: EncodedPayload) -> Result<RawResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// ServiceHealth
// ---------------------------------------------------------------------------

/// Reply of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

impl ServiceHealth {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

// ---------------------------------------------------------------------------
// HttpSubmitter
// ---------------------------------------------------------------------------

/// `reqwest`-backed transport for `POST {endpoint}/api/tts`.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpSubmitter {
    /// `client` is usually shared with the artifact fetcher.
    pub fn new(client: reqwest::Client, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Query `GET /api/health`.
    pub async fn health(&self) -> Result<ServiceHealth, TransportError> {
        let response = self.client.get(self.endpoint.health_url()).send().await?;
        let health = response
            .json::<ServiceHealth>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(health)
    }
}

#[async_trait]
impl SynthesisTransport for HttpSubmitter {
    async fn submit(&self, payload: EncodedPayload) -> Result<RawResponse, TransportError> {
        let url = self.endpoint.synthesis_url();
        log::debug!(
            "http: POST {url} (audio={} bytes, text={} chars, language={})",
            payload.audio.len(),
            payload.text.chars().count(),
            payload.language
        );

        let form = payload
            .into_form()
            .map_err(|e| TransportError::Encode(e.to_string()))?;

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        // Proxies answer failures with HTML; the status alone still decides.
        let body = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(TransportError::Decode(e.to_string())),
            Err(e) => {
                log::debug!("http: non-JSON body on status {status}: {e}");
                serde_json::Value::Null
            }
        };

        log::debug!("http: reply status={status}");
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn keeps_endpoint() {
        let submitter = HttpSubmitter::new(reqwest::Client::new(), endpoint());
        assert_eq!(submitter.endpoint().base(), "http://localhost:5000");
    }

    /// `HttpSubmitter` must be usable as `dyn SynthesisTransport`.
    #[test]
    fn submitter_is_object_safe() {
        let submitter: Box<dyn SynthesisTransport> =
            Box::new(HttpSubmitter::new(reqwest::Client::new(), endpoint()));
        drop(submitter);
    }

    #[test]
    fn health_readiness() {
        let ok: ServiceHealth =
            serde_json::from_str(r#"{"status":"healthy","model_loaded":true}"#).unwrap();
        assert!(ok.is_ready());

        let no_model: ServiceHealth =
            serde_json::from_str(r#"{"status":"healthy","model_loaded":false}"#).unwrap();
        assert!(!no_model.is_ready());

        let bare: ServiceHealth = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(!bare.model_loaded);
    }
}
