//! Client library for a streaming Bicep template generation service.
//!
//! The backend exposes a single `POST /generate` endpoint that answers
//! with a Server-Sent Events stream. This crate provides the pieces a
//! host application needs to drive it:
//!
//! - [`sse::FrameParser`] turns raw response bytes into typed
//!   [`sse::StreamEvent`]s, tolerating arbitrary chunk fragmentation.
//! - [`session::SessionController`] runs one generation session at a
//!   time, supersedes it on a new submit, and delivers events and a
//!   single terminal notification through a [`traits::RenderSink`].
//! - [`client::GeneratorClient`] shapes the HTTP request and maps
//!   transport failures into the [`error::SessionError`] taxonomy.
//!
//! Transport is abstracted behind [`traits::HttpClient`], with a
//! production reqwest adapter and a scriptable mock in [`adapters`].

pub mod adapters;
pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
