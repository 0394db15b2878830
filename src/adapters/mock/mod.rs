//! Mock implementations of the trait abstractions, for testing.

pub mod http;
pub mod render;

pub use http::{MockHttpClient, MockOutcome, RecordedRequest};
pub use render::RecordingSink;
