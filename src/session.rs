//! Streaming session controller.
//!
//! Drives one generation exchange at a time: issues the request, parses
//! the SSE byte stream, and forwards typed events to the host's
//! [`RenderSink`]. At most one session is ever live; a new `generate`
//! call supersedes the previous session, and late events from a
//! superseded session are discarded by id comparison.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::client::GeneratorClient;
use crate::error::{SessionError, SubmitError};
use crate::models::GenerateRequest;
use crate::sse::{FrameParser, StreamEvent};
use crate::traits::{EndReason, RenderSink};

/// Opaque token identifying one generation attempt.
///
/// Ids are allocated from a monotonic counter; a stale id is how the
/// controller recognizes (and drops) events from a superseded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started (or the controller was just created).
    Idle,
    /// Request sent, waiting for the transport to accept.
    Requesting,
    /// Transport accepted; consuming the event stream.
    Streaming,
    /// A `complete` frame arrived. Terminal.
    Complete,
    /// The session failed. Terminal.
    Errored,
    /// The session was superseded. Terminal.
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Complete | SessionState::Errored | SessionState::Cancelled
        )
    }
}

/// What to do when `generate` is called while a session is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupersedePolicy {
    /// Cancel the live session, then start the new one.
    #[default]
    CancelAndRestart,
    /// Reject the new call with [`SubmitError::AlreadyRunning`].
    Ignore,
}

struct ActiveSession {
    id: SessionId,
    state: SessionState,
    handle: Option<JoinHandle<()>>,
}

/// The streaming session controller.
///
/// Owns the current-session slot exclusively; hosts interact through
/// [`generate`](Self::generate) and the [`RenderSink`] they supplied.
pub struct SessionController {
    client: GeneratorClient,
    sink: Arc<dyn RenderSink>,
    policy: SupersedePolicy,
    next_id: AtomicU64,
    current: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(client: GeneratorClient, sink: Arc<dyn RenderSink>) -> Self {
        Self::with_policy(client, sink, SupersedePolicy::default())
    }

    pub fn with_policy(
        client: GeneratorClient,
        sink: Arc<dyn RenderSink>,
        policy: SupersedePolicy,
    ) -> Self {
        Self {
            client,
            sink,
            policy,
            next_id: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Start a generation session. Fire-and-forget: progress arrives via
    /// the render sink.
    ///
    /// The prompt is validated here, before any transport call; an empty
    /// (whitespace-only) prompt is rejected synchronously. If a session is
    /// live the supersede policy decides: cancel-and-restart (default) or
    /// reject.
    pub fn generate(
        self: &Arc<Self>,
        prompt: &str,
        avm: bool,
    ) -> Result<SessionId, SubmitError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyPrompt);
        }

        // Supersede (or refuse) a live predecessor. The state flip and the
        // abort happen under the lock; the sink notification does not.
        let cancelled = {
            let mut current = self.current.lock().unwrap();
            match current.as_mut() {
                Some(live) if !live.state.is_terminal() => {
                    if self.policy == SupersedePolicy::Ignore {
                        return Err(SubmitError::AlreadyRunning);
                    }
                    if let Some(handle) = live.handle.take() {
                        handle.abort();
                    }
                    live.state = SessionState::Cancelled;
                    Some(live.id)
                }
                _ => None,
            }
        };
        if let Some(old_id) = cancelled {
            tracing::info!(%old_id, "superseding live session");
            self.sink.session_ended(old_id, EndReason::Cancelled);
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let request = GenerateRequest::new(prompt, avm);

        {
            let mut current = self.current.lock().unwrap();
            *current = Some(ActiveSession {
                id,
                state: SessionState::Requesting,
                handle: None,
            });
        }

        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move { controller.run_session(id, request).await });

        let mut current = self.current.lock().unwrap();
        if let Some(live) = current.as_mut() {
            if live.id == id {
                live.handle = Some(handle);
            }
        }

        Ok(id)
    }

    /// State of the current session, `Idle` when none was ever started.
    pub fn state(&self) -> SessionState {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|live| live.state)
            .unwrap_or(SessionState::Idle)
    }

    /// Id of the current session, terminal or not.
    pub fn current_session(&self) -> Option<SessionId> {
        self.current.lock().unwrap().as_ref().map(|live| live.id)
    }

    fn is_live(&self, id: SessionId) -> bool {
        self.current
            .lock()
            .unwrap()
            .as_ref()
            .map(|live| live.id == id && !live.state.is_terminal())
            .unwrap_or(false)
    }

    fn set_state_if_live(&self, id: SessionId, state: SessionState) -> bool {
        let mut current = self.current.lock().unwrap();
        match current.as_mut() {
            Some(live) if live.id == id && !live.state.is_terminal() => {
                live.state = state;
                true
            }
            _ => false,
        }
    }

    /// The single place a session reaches a terminal state. Guarantees
    /// exactly one `session_ended` per session: the state flip is guarded
    /// by the current-session lock, and an already-terminal session is
    /// left untouched.
    fn retire(&self, id: SessionId, reason: EndReason) {
        let terminal = match &reason {
            EndReason::Completed => SessionState::Complete,
            EndReason::Failed(_) => SessionState::Errored,
            EndReason::Cancelled => SessionState::Cancelled,
        };
        if self.set_state_if_live(id, terminal) {
            tracing::debug!(%id, state = ?terminal, "session ended");
            self.sink.session_ended(id, reason);
        }
    }

    async fn run_session(self: Arc<Self>, id: SessionId, request: GenerateRequest) {
        let stream = match self.client.stream_generate(&request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(%id, error = %err, "generation request failed");
                self.retire(id, EndReason::Failed(err));
                return;
            }
        };

        if !self.set_state_if_live(id, SessionState::Streaming) {
            // Superseded while waiting for the response headers.
            return;
        }

        let mut stream = stream;
        let mut parser = FrameParser::new();

        while let Some(read) = stream.next().await {
            let bytes = match read {
                Ok(bytes) => bytes,
                Err(err) => {
                    self.retire(
                        id,
                        EndReason::Failed(SessionError::Network(err.to_string())),
                    );
                    return;
                }
            };
            let text = match std::str::from_utf8(&bytes) {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(%id, error = %err, "skipping non-UTF-8 chunk");
                    continue;
                }
            };
            for event in parser.feed(text) {
                if !self.is_live(id) {
                    return;
                }
                match event {
                    StreamEvent::Complete { bicep } => {
                        self.sink.on_event(id, StreamEvent::Complete { bicep });
                        self.retire(id, EndReason::Completed);
                        return;
                    }
                    StreamEvent::Error { error } => {
                        self.sink
                            .on_event(id, StreamEvent::Error { error: error.clone() });
                        self.retire(id, EndReason::Failed(SessionError::Application(error)));
                        return;
                    }
                    other => self.sink.on_event(id, other),
                }
            }
        }

        parser.finish();
        // The server closed the connection without a terminal frame.
        self.retire(
            id,
            EndReason::Failed(SessionError::Network(
                "stream closed before completion".to_string(),
            )),
        );
    }
}
