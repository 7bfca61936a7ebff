//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the HTTP client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Redirect following policy.
    pub redirects: RedirectConfig,

    /// Transport and read buffering.
    pub transport: TransportConfig,

    /// Wire protocol settings.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-operation deadline (connect, redirects, body) in seconds.
    pub request_secs: u64,

    /// Deadline for resolving and connecting a single attempt in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 10,
        }
    }
}

/// Redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Maximum number of redirects followed per request.
    pub max_redirects: u32,

    /// Fail with `TooManyRedirects` instead of returning the last redirect
    /// response when the cap is reached.
    pub strict: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            max_redirects: 2,
            strict: false,
        }
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Upper bound for a single read request while decoding a body.
    pub read_buffer_size: usize,

    /// Longest accepted status, header or chunk-size line, in bytes.
    pub max_line_length: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 4096,
            max_line_length: 8192,
        }
    }
}

/// HTTP wire settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Protocol version written on the request line ("1.0" or "1.1").
    pub version: String,

    /// Value of the injected `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            user_agent: concat!("http1-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record request metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
