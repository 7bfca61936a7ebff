//! Minimal async HTTP/1.x client.
//!
//! One fresh connection per request (plain TCP or TLS), a request encoder,
//! a status/header parser, chunked / length-bounded / close-delimited body
//! decoding and bounded redirect following, wrapped in a whole-operation
//! timeout.
//!
//! ```no_run
//! # async fn demo() -> http1_client::Result<()> {
//! use http1_client::RequestOptions;
//!
//! let resp = http1_client::get("http://example.com/", RequestOptions::new()).await?;
//! println!("{} {}", resp.status_code(), resp.text());
//! # Ok(())
//! # }
//! ```

// Protocol core
pub mod http;
pub mod net;

// Entry points
pub mod blocking;
pub mod client;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;

pub use client::{
    delete, get, head, post, put, request, Client, LegacyOption, MemoryHook, RequestOptions,
};
pub use config::ClientConfig;
pub use error::{ConnectionError, Error, Result};
pub use http::{Method, Response, Url};
