//! Error types surfaced to callers.
//!
//! Callers see two failure kinds from a request, [`Error::Connection`] and
//! [`Error::Timeout`], plus [`Error::Json`] raised lazily by
//! [`Response::json`](crate::Response::json). Everything that goes wrong inside
//! the request pipeline is wrapped into a [`ConnectionError`] that keeps the
//! original cause.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Top-level error returned by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// The request pipeline failed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// The whole-operation deadline elapsed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body is not valid JSON.
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Returns the pipeline cause, if this is a connection error.
    pub fn connection_cause(&self) -> Option<&ConnectionError> {
        match self {
            Error::Connection(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Connection(ConnectionError::Io(e))
    }
}

/// Causes of a failed request attempt.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Caller supplied an unusable combination of arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// URL scheme other than http or https.
    #[error("unsupported protocol: {0}")]
    UnsupportedScheme(String),

    /// Host name did not resolve to any address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// TCP connect failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Connect step exceeded its own deadline.
    #[error("connect to {0} timed out")]
    ConnectTimeout(String),

    /// TLS setup or handshake failed.
    #[error("tls handshake with {host} failed: {source}")]
    Tls {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Read or write on an established connection failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Status line missing or its code is not numeric.
    #[error("malformed status line: {0:?}")]
    StatusLine(String),

    /// A status or header line exceeded the configured limit.
    #[error("response head line exceeds {0} bytes")]
    HeadLineTooLong(usize),

    /// Chunked transfer framing violated.
    #[error("chunked framing error: {0}")]
    ChunkFraming(String),

    /// Redirect cap reached while the server still redirects (strict mode).
    #[error("too many redirects ({0})")]
    TooManyRedirects(u32),

    /// JSON request body could not be serialized.
    #[error("failed to encode json body: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

impl ConnectionError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionError::InvalidArgument(_) => "invalid_argument",
            ConnectionError::InvalidUrl(_) => "invalid_url",
            ConnectionError::UnsupportedScheme(_) => "unsupported_scheme",
            ConnectionError::Resolve { .. } => "resolve",
            ConnectionError::Connect { .. } => "connect",
            ConnectionError::ConnectTimeout(_) => "connect_timeout",
            ConnectionError::Tls { .. } => "tls",
            ConnectionError::Io(_) => "io",
            ConnectionError::StatusLine(_) => "status_line",
            ConnectionError::HeadLineTooLong(_) => "head_line_too_long",
            ConnectionError::ChunkFraming(_) => "chunk_framing",
            ConnectionError::TooManyRedirects(_) => "too_many_redirects",
            ConnectionError::JsonEncode(_) => "json_encode",
        }
    }
}

/// Result alias for client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
