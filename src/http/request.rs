//! Request model and wire encoding.
//!
//! # Wire layout
//! ```text
//! METHOD /target HTTP/<version>\r\n
//! Host: <host[:port]>\r\n
//! Connection: close\r\n
//! <caller headers>\r\n
//! User-Agent / Content-Type / Content-Length  (only when not already present)
//! \r\n
//! <body>
//! ```

use std::fmt::{self, Write as _};
use std::str::FromStr;

use bytes::Bytes;

use crate::error::ConnectionError;
use crate::http::headers::Headers;
use crate::http::url::Url;

/// Supported request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ConnectionError::InvalidArgument(format!(
                "unsupported method {s:?}"
            ))),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// Raw bytes sent as-is.
    Bytes(Bytes),
    /// Structured value serialized as compact JSON at encode time.
    Json(serde_json::Value),
}

/// One request attempt. Only the URL changes between redirects.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: Headers,
    pub(crate) body: Body,
}

impl Request {
    /// Build a request; raw and JSON bodies are mutually exclusive.
    pub fn new(
        method: Method,
        url: Url,
        headers: Headers,
        data: Option<Bytes>,
        json: Option<serde_json::Value>,
    ) -> Result<Self, ConnectionError> {
        let body = match (data, json) {
            (Some(_), Some(_)) => {
                return Err(ConnectionError::InvalidArgument(
                    "data and json bodies are mutually exclusive".into(),
                ))
            }
            (Some(data), None) => Body::Bytes(data),
            (None, Some(json)) => Body::Json(json),
            (None, None) => Body::Empty,
        };
        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Serialize the request for `HTTP/<version>`.
    ///
    /// Auto-injected headers are skipped when the header text built so far
    /// already contains the same name (case-sensitive substring match).
    pub fn encode(&self, version: &str, user_agent: &str) -> Result<Vec<u8>, ConnectionError> {
        let mut head = String::with_capacity(256);
        // Writing into a String cannot fail.
        let _ = write!(head, "Host: {}\r\n", self.url.host_header());
        head.push_str("Connection: close\r\n");
        for (name, value) in self.headers.iter() {
            let _ = write!(head, "{name}: {value}\r\n");
        }

        if !head.contains("User-Agent:") {
            let _ = write!(head, "User-Agent: {user_agent}\r\n");
        }

        let body: Option<Vec<u8>> = match &self.body {
            Body::Empty => None,
            Body::Bytes(bytes) => Some(bytes.to_vec()),
            Body::Json(value) => {
                if !head.contains("Content-Type:") {
                    head.push_str("Content-Type: application/json\r\n");
                }
                Some(serde_json::to_vec(value).map_err(ConnectionError::JsonEncode)?)
            }
        };
        let body = body.filter(|b| !b.is_empty());

        if let Some(body) = &body {
            if !head.contains("Content-Length:") {
                let _ = write!(head, "Content-Length: {}\r\n", body.len());
            }
        }

        let request_line = format!(
            "{} {} HTTP/{}\r\n",
            self.method,
            self.url.target(),
            version
        );

        let body_len = body.as_ref().map_or(0, Vec::len);
        let mut wire = Vec::with_capacity(request_line.len() + head.len() + 2 + body_len);
        wire.extend_from_slice(request_line.as_bytes());
        wire.extend_from_slice(head.as_bytes());
        wire.extend_from_slice(b"\r\n");
        if let Some(body) = body {
            wire.extend_from_slice(&body);
        }
        Ok(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn encode(req: &Request) -> String {
        String::from_utf8(req.encode("1.0", "test-agent").unwrap()).unwrap()
    }

    #[test]
    fn plain_get_layout() {
        let req = Request::new(
            Method::Get,
            url("http://example.com/a?b=1"),
            Headers::new(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(
            encode(&req),
            "GET /a?b=1 HTTP/1.0\r\n\
             Host: example.com\r\n\
             Connection: close\r\n\
             User-Agent: test-agent\r\n\
             \r\n"
        );
    }

    #[test]
    fn json_body_injects_headers_once() {
        let req = Request::new(
            Method::Post,
            url("http://example.com:8080/items"),
            Headers::new(),
            None,
            Some(json!({"a": 1})),
        )
        .unwrap();
        let wire = encode(&req);
        assert_eq!(wire.matches("Content-Type: application/json\r\n").count(), 1);
        assert!(wire.contains("Host: example.com:8080\r\n"));
        assert!(wire.contains("Content-Length: 7\r\n"));
        assert!(wire.ends_with("\r\n\r\n{\"a\":1}"));
    }

    #[test]
    fn caller_headers_suppress_injection() {
        let headers: Headers = [
            ("Content-Type", "application/vnd.api+json"),
            ("User-Agent", "mine"),
            ("Content-Length", "7"),
        ]
        .into_iter()
        .collect();
        let req = Request::new(
            Method::Put,
            url("http://example.com/"),
            headers,
            None,
            Some(json!({"a": 1})),
        )
        .unwrap();
        let wire = encode(&req);
        assert_eq!(wire.matches("Content-Type:").count(), 1);
        assert_eq!(wire.matches("User-Agent:").count(), 1);
        assert_eq!(wire.matches("Content-Length:").count(), 1);
        assert!(wire.contains("Content-Type: application/vnd.api+json\r\n"));
        assert!(!wire.contains("test-agent"));
    }

    #[test]
    fn injection_check_is_case_sensitive() {
        let headers: Headers = [("user-agent", "lower")].into_iter().collect();
        let req = Request::new(Method::Get, url("http://h/"), headers, None, None).unwrap();
        let wire = encode(&req);
        assert!(wire.contains("user-agent: lower\r\n"));
        assert!(wire.contains("User-Agent: test-agent\r\n"));
    }

    #[test]
    fn raw_body_gets_length_only() {
        let req = Request::new(
            Method::Post,
            url("http://h/"),
            Headers::new(),
            Some(Bytes::from_static(b"hello")),
            None,
        )
        .unwrap();
        let wire = encode(&req);
        assert!(wire.contains("Content-Length: 5\r\n"));
        assert!(!wire.contains("Content-Type"));
        assert!(wire.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn empty_body_has_no_length() {
        let req = Request::new(
            Method::Post,
            url("http://h/"),
            Headers::new(),
            Some(Bytes::new()),
            None,
        )
        .unwrap();
        assert!(!encode(&req).contains("Content-Length"));
    }

    #[test]
    fn data_and_json_are_exclusive() {
        let err = Request::new(
            Method::Post,
            url("http://h/"),
            Headers::new(),
            Some(Bytes::from_static(b"x")),
            Some(json!(1)),
        )
        .unwrap_err();
        assert!(matches!(err, ConnectionError::InvalidArgument(_)));
    }

    #[test]
    fn method_round_trips_through_str() {
        for m in [Method::Get, Method::Head, Method::Post, Method::Put, Method::Delete] {
            assert_eq!(m.as_str().parse::<Method>().unwrap(), m);
        }
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
        assert!("PATCH".parse::<Method>().is_err());
    }
}
