//! Per-request options.

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;

use crate::http::headers::Headers;

/// Options accepted for compatibility but without any effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyOption {
    Cookies,
    Files,
    Auth,
    Proxies,
    Stream,
    Verify,
    Cert,
    Hooks,
}

impl LegacyOption {
    pub fn as_str(self) -> &'static str {
        match self {
            LegacyOption::Cookies => "cookies",
            LegacyOption::Files => "files",
            LegacyOption::Auth => "auth",
            LegacyOption::Proxies => "proxies",
            LegacyOption::Stream => "stream",
            LegacyOption::Verify => "verify",
            LegacyOption::Cert => "cert",
            LegacyOption::Hooks => "hooks",
        }
    }
}

/// Builder for the optional parts of a request.
///
/// ```
/// use http1_client::RequestOptions;
///
/// let options = RequestOptions::new()
///     .param("page", "2")
///     .header("Accept", "application/json")
///     .allow_redirects(false);
/// assert!(!options.redirects_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub(crate) params: Vec<(String, String)>,
    pub(crate) headers: Headers,
    pub(crate) data: Option<Bytes>,
    pub(crate) json: Option<Value>,
    pub(crate) allow_redirects: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) ignored: Vec<LegacyOption>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            headers: Headers::new(),
            data: None,
            json: None,
            allow_redirects: true,
            timeout: None,
            ignored: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter. Values are sent as given, unencoded.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a request header, replacing an earlier value for the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Raw request body. Conflicts with [`json`](Self::json).
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// JSON request body. Conflicts with [`data`](Self::data).
    pub fn json(mut self, json: impl Into<Value>) -> Self {
        self.json = Some(json.into());
        self
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }

    /// Whole-operation deadline, overriding `timeouts.request_secs`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept a legacy option. It is logged and otherwise ignored.
    pub fn ignore(mut self, option: LegacyOption) -> Self {
        self.ignored.push(option);
        self
    }

    pub fn redirects_allowed(&self) -> bool {
        self.allow_redirects
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn log_ignored(&self) {
        for option in &self.ignored {
            tracing::debug!(option = option.as_str(), "Ignoring unsupported request option");
        }
    }
}
