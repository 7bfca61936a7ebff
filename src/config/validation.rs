//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and header safety. All
//! problems are reported, not just the first.

use thiserror::Error;

use crate::config::schema::ClientConfig;

const MAX_READ_BUFFER: usize = 1024 * 1024;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("transport.read_buffer_size {0} exceeds 1048576 bytes")]
    ReadBufferTooLarge(usize),

    #[error("unsupported http.version {0:?} (expected \"1.0\" or \"1.1\")")]
    HttpVersion(String),

    #[error("http.user_agent must be a non-empty single line")]
    UserAgent,

    #[error("unknown observability.log_level {0:?}")]
    LogLevel(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }

    let buf = config.transport.read_buffer_size;
    if buf == 0 {
        errors.push(ValidationError::Zero("transport.read_buffer_size"));
    } else if buf > MAX_READ_BUFFER {
        errors.push(ValidationError::ReadBufferTooLarge(buf));
    }

    if config.transport.max_line_length == 0 {
        errors.push(ValidationError::Zero("transport.max_line_length"));
    }

    if !matches!(config.http.version.as_str(), "1.0" | "1.1") {
        errors.push(ValidationError::HttpVersion(config.http.version.clone()));
    }

    let ua = &config.http.user_agent;
    if ua.trim().is_empty() || ua.contains(['\r', '\n']) {
        errors.push(ValidationError::UserAgent);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
