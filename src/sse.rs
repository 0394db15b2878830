//! SSE (Server-Sent Events) frame parser for the generation stream.
//!
//! The backend emits frames of the form `data: <json>` terminated by a
//! blank line. The JSON carries a `status` discriminator:
//! - `progress` - human-readable status update
//! - `streaming` - incremental content is about to start
//! - `chunk` - incremental content fragment
//! - `debug` - structured timing/search metrics
//! - `complete` - final result, optionally with the full Bicep source
//! - `error` - application-level failure
//!
//! Frames without the `data: ` prefix (comments, keep-alives) are ignored.
//! A frame that fails to decode is dropped with a warning; it never aborts
//! the stream.

use serde::{Deserialize, Serialize};

use crate::models::DebugInfo;

/// Line prefix introducing a data frame.
const DATA_PREFIX: &str = "data: ";

/// Blank-line frame delimiter.
const FRAME_DELIMITER: &str = "\n\n";

/// Typed events decoded from the generation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Status update while the backend searches and prepares context.
    Progress { message: String },
    /// Incremental content starts now; renderers reset any accumulation.
    Streaming { message: String },
    /// Incremental content fragment; renderers append.
    Chunk { content: String },
    /// Structured metrics block, forwarded verbatim.
    Debug { debug: DebugInfo },
    /// Generation finished. `bicep` may be absent when the content was
    /// delivered entirely through `chunk` frames.
    Complete {
        #[serde(default)]
        bicep: Option<String>,
    },
    /// Application-level failure reported by the backend.
    Error { error: String },
}

impl StreamEvent {
    /// Event discriminator as it appears on the wire, for logging.
    pub fn status_name(&self) -> &'static str {
        match self {
            StreamEvent::Progress { .. } => "progress",
            StreamEvent::Streaming { .. } => "streaming",
            StreamEvent::Chunk { .. } => "chunk",
            StreamEvent::Debug { .. } => "debug",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// True for the frames that end a session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Complete { .. } | StreamEvent::Error { .. }
        )
    }
}

/// Decode one complete frame into an event.
///
/// Returns `None` for comment/keep-alive frames (no `data: ` prefix) and
/// for frames whose JSON payload does not decode; the latter is logged.
fn decode_frame(frame: &str) -> Option<StreamEvent> {
    let payload = frame.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, "dropping undecodable SSE frame");
            None
        }
    }
}

/// Stateful frame parser, tolerant of partial delivery at arbitrary byte
/// boundaries.
///
/// The buffer always holds the suffix of the input after the last
/// blank-line delimiter seen so far. Feeding the same logical stream in
/// different chunkings yields the same event sequence.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` to the buffer and decode every frame it completes.
    ///
    /// The final, possibly-incomplete segment stays buffered for the next
    /// call.
    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        self.buffer.push_str(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find(FRAME_DELIMITER) {
            let frame: String = self.buffer.drain(..pos + FRAME_DELIMITER.len()).collect();
            let frame = frame.trim_end_matches(['\n', '\r']);
            if frame.is_empty() {
                continue;
            }
            if let Some(event) = decode_frame(frame) {
                events.push(event);
            }
        }
        events
    }

    /// Signal end-of-stream.
    ///
    /// Any residual partial frame was never terminated and is discarded;
    /// known information loss, not an error.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            tracing::debug!(
                len = self.buffer.len(),
                "discarding incomplete SSE frame at end of stream"
            );
            self.buffer.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut FrameParser, chunks: &[&str]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(parser.feed(chunk));
        }
        parser.finish();
        events
    }

    #[test]
    fn test_single_progress_frame() {
        let mut parser = FrameParser::new();
        let events =
            parser.feed("data: {\"status\":\"progress\",\"message\":\"Searching...\"}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Progress {
                message: "Searching...".to_string()
            }]
        );
    }

    #[test]
    fn test_partial_frame_is_retained() {
        let mut parser = FrameParser::new();
        assert!(parser.feed("data: {\"status\":\"progress\",").is_empty());
        let events = parser.feed("\"message\":\"hi\"}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Progress {
                message: "hi".to_string()
            }]
        );
    }

    #[test]
    fn test_fragmentation_invariance() {
        // The same logical stream must decode identically no matter where
        // the transport splits it.
        let stream = concat!(
            "data: {\"status\":\"progress\",\"message\":\"Validating request...\"}\n\n",
            "data: {\"status\":\"streaming\",\"message\":\"Generating...\"}\n\n",
            "data: {\"status\":\"chunk\",\"content\":\"resource \"}\n\n",
            "data: {\"status\":\"chunk\",\"content\":\"foo {}\"}\n\n",
            "data: {\"status\":\"complete\",\"bicep\":\"resource foo {}\"}\n\n",
        );

        let mut whole = FrameParser::new();
        let expected = feed_all(&mut whole, &[stream]);
        assert_eq!(expected.len(), 5);

        // Split at every third byte boundary that is a char boundary.
        for step in [1, 2, 3, 7, 16, 41] {
            let mut parser = FrameParser::new();
            let mut events = Vec::new();
            let mut rest = stream;
            while !rest.is_empty() {
                let mut at = step.min(rest.len());
                while !rest.is_char_boundary(at) {
                    at -= 1;
                }
                let (head, tail) = rest.split_at(at);
                events.extend(parser.feed(head));
                rest = tail;
            }
            parser.finish();
            assert_eq!(events, expected, "chunk size {}", step);
        }
    }

    #[test]
    fn test_malformed_frame_between_valid_frames() {
        let mut parser = FrameParser::new();
        let events = feed_all(
            &mut parser,
            &[
                "data: {\"status\":\"progress\",\"message\":\"one\"}\n\n",
                "data: {not json at all\n\n",
                "data: {\"status\":\"progress\",\"message\":\"two\"}\n\n",
            ],
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::Progress {
                    message: "one".to_string()
                },
                StreamEvent::Progress {
                    message: "two".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_status_is_dropped() {
        let mut parser = FrameParser::new();
        let events = parser.feed("data: {\"status\":\"telemetry\",\"x\":1}\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_comment_frames_ignored() {
        let mut parser = FrameParser::new();
        let events = feed_all(
            &mut parser,
            &[
                ": keep-alive\n\n",
                "event: noise\n\n",
                "data: {\"status\":\"progress\",\"message\":\"hi\"}\n\n",
            ],
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_crlf_tolerated_before_delimiter() {
        let mut parser = FrameParser::new();
        let events = parser.feed("data: {\"status\":\"progress\",\"message\":\"hi\"}\r\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Progress {
                message: "hi".to_string()
            }]
        );
    }

    #[test]
    fn test_residual_partial_frame_discarded_at_finish() {
        let mut parser = FrameParser::new();
        assert!(parser
            .feed("data: {\"status\":\"complete\",\"bicep\":\"trunc")
            .is_empty());
        parser.finish();
        // Buffer is gone; the next stream starts clean.
        assert!(parser.feed("\"}\n\n").is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut parser = FrameParser::new();
        let events = parser.feed(concat!(
            "data: {\"status\":\"chunk\",\"content\":\"a\"}\n\n",
            "data: {\"status\":\"chunk\",\"content\":\"b\"}\n\n",
        ));
        assert_eq!(
            events,
            vec![
                StreamEvent::Chunk {
                    content: "a".to_string()
                },
                StreamEvent::Chunk {
                    content: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_complete_without_bicep() {
        let mut parser = FrameParser::new();
        let events = parser.feed("data: {\"status\":\"complete\"}\n\n");
        assert_eq!(events, vec![StreamEvent::Complete { bicep: None }]);
    }

    #[test]
    fn test_debug_frame() {
        let mut parser = FrameParser::new();
        let events = parser.feed(
            "data: {\"status\":\"debug\",\"debug\":{\"cache_hit\":true,\"total_time\":1.5,\"result_count\":3}}\n\n",
        );
        match &events[..] {
            [StreamEvent::Debug { debug }] => {
                assert_eq!(debug.cache_hit, Some(true));
                assert_eq!(debug.total_time, Some(1.5));
                assert_eq!(debug.result_count, Some(3));
            }
            other => panic!("expected one Debug event, got {:?}", other),
        }
    }

    #[test]
    fn test_error_frame() {
        let mut parser = FrameParser::new();
        let events = parser.feed("data: {\"status\":\"error\",\"error\":\"model unavailable\"}\n\n");
        assert_eq!(
            events,
            vec![StreamEvent::Error {
                error: "model unavailable".to_string()
            }]
        );
        assert!(events[0].is_terminal());
    }

    #[test]
    fn test_status_names() {
        assert_eq!(
            StreamEvent::Complete { bicep: None }.status_name(),
            "complete"
        );
        assert_eq!(
            StreamEvent::Chunk {
                content: String::new()
            }
            .status_name(),
            "chunk"
        );
    }
}
