//! Generation API client.
//!
//! Thin wrapper over the [`HttpClient`] transport for the backend's
//! `POST /generate` streaming endpoint.

use std::sync::Arc;

use crate::error::SessionError;
use crate::models::{ErrorBody, GenerateRequest};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// Default base URL of the generation backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client for the generation backend.
#[derive(Clone)]
pub struct GeneratorClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl GeneratorClient {
    /// Create a client against the default base URL.
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        }
    }

    /// Create a client against a custom base URL.
    pub fn with_url(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the request and return the SSE byte stream.
    ///
    /// Non-2xx responses become [`SessionError::RequestRejected`], with the
    /// message taken from the structured `{"error": ...}` body when the
    /// backend sent one, else derived from the status. Everything else
    /// transport-shaped becomes [`SessionError::Network`].
    pub async fn stream_generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<ByteStream, SessionError> {
        let url = format!("{}/generate", self.base_url);
        let body = serde_json::to_string(request)
            .map_err(|e| SessionError::Network(format!("failed to encode request: {}", e)))?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(url = %url, mode = %request.mode, "issuing generation request");

        self.http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|err| match err {
                HttpError::ServerError { status, message } => {
                    let message = match serde_json::from_str::<ErrorBody>(&message) {
                        Ok(body) => body.error,
                        Err(_) => format!("Error: {}", status),
                    };
                    SessionError::RequestRejected { status, message }
                }
                other => SessionError::Network(other.to_string()),
            })
    }
}
