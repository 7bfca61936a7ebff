//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the request pipeline with the whole-operation deadline
//! - Map an elapsed deadline to `Error::Timeout`
//!
//! On timeout the pipeline future is dropped mid-flight. Its connection is
//! released by drop: the file descriptor is closed and the open-connection
//! count falls back, but the async shutdown in `Connection::close` never runs,
//! so a TLS peer receives no close_notify.

use std::future::Future;
use std::time::Duration;

use crate::error::{ConnectionError, Error};

/// Run `fut` under `deadline`. Pipeline errors become `Error::Connection`.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, ConnectionError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(Error::Connection),
        Err(_) => {
            tracing::warn!(deadline = ?deadline, "Request deadline elapsed");
            Err(Error::Timeout(deadline))
        }
    }
}
