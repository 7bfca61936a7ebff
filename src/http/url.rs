//! Request URLs: `http` or `https` only, resolved with the `url` crate.
//!
//! The fragment never reaches the wire. Query parameters added through
//! [`Url::with_params`] are appended to the request target exactly as the
//! caller wrote them, without percent-encoding.

use std::fmt;

use crate::error::ConnectionError;

/// Supported URL schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Port used when the URL does not name one.
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    inner: url::Url,
    scheme: Scheme,
    /// Host for resolving and TLS; IPv6 literals without brackets.
    host: String,
    /// Path plus query, always starting with `/`.
    target: String,
}

impl Url {
    /// Parse an absolute `http` or `https` URL.
    pub fn parse(input: &str) -> Result<Self, ConnectionError> {
        let inner = url::Url::parse(input.trim())
            .map_err(|e| ConnectionError::InvalidUrl(format!("{input}: {e}")))?;
        Self::from_url(inner)
    }

    fn from_url(mut inner: url::Url) -> Result<Self, ConnectionError> {
        let scheme = match inner.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(ConnectionError::UnsupportedScheme(other.to_string())),
        };
        let host = match inner.host() {
            Some(url::Host::Ipv6(addr)) => addr.to_string(),
            Some(host) => host.to_string(),
            None => return Err(ConnectionError::InvalidUrl(inner.to_string())),
        };
        inner.set_fragment(None);

        let target = match inner.query() {
            Some(query) => format!("{}?{}", inner.path(), query),
            None => inner.path().to_string(),
        };
        Ok(Self {
            inner,
            scheme,
            host,
            target,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.inner
            .port()
            .unwrap_or_else(|| self.scheme.default_port())
    }

    /// Path and query as written on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// Value for the `Host` header; the port appears only when non-default.
    pub fn host_header(&self) -> String {
        let host = self.inner.host_str().unwrap_or(&self.host);
        match self.inner.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Append `key=value` pairs to the query, joined by `&`, unencoded.
    pub fn with_params<K, V>(mut self, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if params.is_empty() {
            return self;
        }
        let base = self.target.trim_end_matches('?').to_string();
        let joined = params
            .iter()
            .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
            .collect::<Vec<_>>()
            .join("&");

        self.target = if base.contains('?') {
            format!("{}&{}", base.trim_end_matches('&'), joined)
        } else {
            format!("{base}?{joined}")
        };
        // Keep the resolution base in step with what goes on the wire.
        let query = self.target.split_once('?').map(|(_, q)| q);
        self.inner.set_query(query);
        self
    }

    /// Resolve a `Location` value against this URL (RFC 3986 reference
    /// resolution). The result must again be `http` or `https`.
    pub fn join(&self, location: &str) -> Result<Url, ConnectionError> {
        let location = location.trim();
        let joined = self
            .inner
            .join(location)
            .map_err(|e| ConnectionError::InvalidUrl(format!("{location}: {e}")))?;
        Self::from_url(joined)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme.as_str(), self.host_header(), self.target)
    }
}
