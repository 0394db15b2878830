//! Render sink trait: the controller's output-side collaborator.
//!
//! The host UI implements [`RenderSink`] to receive parsed events one at a
//! time, in wire order, plus a single end-of-session notification. After a
//! session is superseded the sink simply stops being called for it, so
//! implementations need no special teardown handling.

use crate::error::SessionError;
use crate::session::SessionId;
use crate::sse::StreamEvent;

/// Why a session ended. Exactly one of these is delivered per session.
#[derive(Debug, Clone, PartialEq)]
pub enum EndReason {
    /// A `complete` frame arrived.
    Completed,
    /// The session failed; see [`SessionError`] for the taxonomy.
    Failed(SessionError),
    /// The session was superseded by a newer `generate` call.
    Cancelled,
}

/// Observer for session output.
///
/// Events are delivered in the exact order frames were parsed. All calls
/// for one session carry the same [`SessionId`], so hosts that interleave
/// sessions can discard stragglers by id.
pub trait RenderSink: Send + Sync {
    /// One decoded event from a live session.
    fn on_event(&self, session: SessionId, event: StreamEvent);

    /// Terminal notification; no further calls follow for this session.
    fn session_ended(&self, session: SessionId, reason: EndReason);
}
