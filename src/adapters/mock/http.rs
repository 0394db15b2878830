//! Mock HTTP transport for testing.
//!
//! Scriptable stand-in for the streaming transport: tests queue chunk
//! sequences or failures and verify the requests the session layer made,
//! all without a network stack.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt as _;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

/// One scripted outcome for `post_stream`.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Accept the request and deliver these chunks, then close the stream.
    Stream(Vec<Bytes>),
    /// Accept the request, deliver the leading chunks, then fail the read.
    StreamThenError(Vec<Bytes>, HttpError),
    /// Accept the request, deliver the chunks, then hang forever (a
    /// connection the server keeps open).
    StreamThenPending(Vec<Bytes>),
    /// Reject the request outright.
    Error(HttpError),
}

/// Mock HTTP client.
///
/// Outcomes are consumed in FIFO order, one per call; when the script runs
/// dry every call fails. Cloning shares the script and the recorded
/// requests.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next outcome.
    pub fn push_outcome(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }

    /// Convenience: queue a successful stream built from string chunks.
    pub fn push_stream(&self, chunks: &[&str]) {
        self.push_outcome(MockOutcome::Stream(
            chunks.iter().map(|c| Bytes::from(c.to_string())).collect(),
        ));
    }

    /// All recorded requests, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> Option<MockOutcome> {
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            None
        } else {
            Some(outcomes.remove(0))
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });

        match self.next_outcome() {
            Some(MockOutcome::Stream(chunks)) => {
                let stream = futures::stream::iter(chunks.into_iter().map(Ok));
                Ok(Box::pin(stream))
            }
            Some(MockOutcome::StreamThenError(chunks, err)) => {
                let items: Vec<Result<Bytes, HttpError>> = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(err)))
                    .collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Some(MockOutcome::StreamThenPending(chunks)) => {
                let head = futures::stream::iter(chunks.into_iter().map(Ok));
                Ok(Box::pin(head.chain(futures::stream::pending())))
            }
            Some(MockOutcome::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "no scripted outcome for request to {}",
                url
            ))),
        }
    }
}
