//! Trait abstractions for dependency injection.
//!
//! This module provides trait-based abstractions for external
//! dependencies, enabling testing through mock implementations:
//!
//! - [`HttpClient`] - streaming HTTP transport
//! - [`RenderSink`] - host-facing event observer

pub mod http;
pub mod render;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
pub use render::{EndReason, RenderSink};
