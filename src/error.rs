//! Session error taxonomy.
//!
//! Frame decode failures are deliberately absent: they are absorbed at the
//! parser boundary (see [`crate::sse::FrameParser`]) and never terminate a
//! session.

use thiserror::Error;

/// Terminal failures of a generation session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The backend rejected the request before streaming began (non-2xx).
    #[error("request rejected ({status}): {message}")]
    RequestRejected { status: u16, message: String },

    /// Transport-level failure: connect error, mid-stream disconnect,
    /// premature close.
    #[error("network error: {0}")]
    Network(String),

    /// An explicit `error` frame from the service.
    #[error("generation failed: {0}")]
    Application(String),
}

/// Errors reported synchronously by [`SessionController::generate`],
/// before any transport call is made.
///
/// [`SessionController::generate`]: crate::session::SessionController::generate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Prompt was empty or whitespace-only.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A session is already in flight and the controller is configured to
    /// reject concurrent submissions rather than supersede.
    #[error("a generation is already running")]
    AlreadyRunning,
}
