//! Synchronous entry points.
//!
//! Each call builds a private current-thread runtime and drives the async
//! pipeline to completion on the calling thread. Do not call these from
//! inside an async context: tokio refuses to start a runtime there and the
//! call panics.

use tokio::runtime::Builder;

use crate::client::{self, RequestOptions};
use crate::error::Result;
use crate::http::request::Method;
use crate::http::response::Response;

/// Run one request to completion on the calling thread.
pub fn request(method: Method, url: &str, options: RequestOptions) -> Result<Response> {
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(client::request(method, url, options))
}

pub fn get(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Get, url, options)
}

pub fn head(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Head, url, options)
}

pub fn post(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Post, url, options)
}

pub fn put(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Put, url, options)
}

pub fn delete(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Delete, url, options)
}
