//! HTTP transport trait abstraction.
//!
//! Abstracts the one transport verb this crate needs - a POST whose
//! response body is consumed incrementally - so the session layer can be
//! driven by a mock in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Streaming response body: bytes as they arrive on the wire.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection could not be established
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned a non-success status; `message` is the raw body
    ServerError { status: u16, message: String },
    /// IO failure while reading the body
    Io(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for the streaming POST transport.
///
/// Implementations include the production reqwest-based client and the
/// in-crate mock for tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request and return the response body as a stream.
    ///
    /// A non-success status is an error (`HttpError::ServerError` carrying
    /// the body text), not a stream.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
