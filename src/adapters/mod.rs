//! Concrete implementations of the trait abstractions.
//!
//! Production adapters live at the top level; test doubles under
//! [`mock`].

pub mod mock;
pub mod reqwest_http;

pub use reqwest_http::ReqwestHttpClient;
