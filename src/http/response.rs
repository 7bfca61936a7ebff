//! Caller-visible response.

use std::fmt;

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::http::head::ResponseHead;
use crate::http::headers::Headers;
use crate::http::url::Url;

/// Fully buffered HTTP response.
///
/// The connection is already closed when a `Response` exists; it owns the
/// body outright.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    reason: String,
    url: Url,
    headers: Headers,
    content: Bytes,
    charset: String,
    json: bool,
}

impl Response {
    /// Assemble a response from its head, the URL that produced it and the body.
    pub fn from_parts(head: ResponseHead, url: Url, content: Bytes) -> Self {
        let encoding = encoding_for(head.charset());
        let headers = head
            .lines()
            .iter()
            .map(|raw| {
                let line = decode_with(encoding, raw);
                let line = line.trim();
                match line.split_once(':') {
                    Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
                    None => (line.to_string(), line.to_string()),
                }
            })
            .collect();

        Self {
            status_code: head.status(),
            reason: head.reason().to_string(),
            url,
            headers,
            content,
            charset: head.charset().to_string(),
            json: head.is_json(),
        }
    }

    /// HTTP status code (e.g. 200, 404).
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Reason phrase; empty if the server sent none.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// URL of the request that produced this response, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers, last value wins on duplicate names.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive single header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_ignore_case(name)
    }

    /// Raw body bytes.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Consume the response and return the body bytes.
    pub fn into_content(self) -> Bytes {
        self.content
    }

    /// Charset used for [`text`](Self::text) and header decoding.
    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// True if the server declared an `application/json` body.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Body decoded with the response charset; malformed sequences are replaced.
    pub fn text(&self) -> String {
        decode_with(encoding_for(&self.charset), &self.content)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.content)?)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}]>", self.status_code)
    }
}

/// Unknown labels fall back to UTF-8.
fn encoding_for(charset: &str) -> &'static Encoding {
    Encoding::for_label(charset.trim().as_bytes()).unwrap_or(UTF_8)
}

fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response(head: &[u8], lines: &[&str], body: &'static [u8]) -> Response {
        let lines = lines.iter().map(|l| format!("{l}\r\n").into_bytes()).collect();
        let head = ResponseHead::from_parts(head, lines).unwrap();
        Response::from_parts(head, Url::parse("http://example.com/").unwrap(), Bytes::from_static(body))
    }

    #[test]
    fn header_mapping_last_wins() {
        let resp = response(
            b"HTTP/1.1 200 OK\r\n",
            &["Set-Thing: a", "X-Odd", "Set-Thing: b", "Date: Mon, 01 Jan 2024 10:00:00 GMT"],
            b"",
        );
        assert_eq!(resp.headers().get("Set-Thing"), Some("b"));
        assert_eq!(resp.headers().get("X-Odd"), Some("X-Odd"));
        assert_eq!(resp.header("date"), Some("Mon, 01 Jan 2024 10:00:00 GMT"));
        assert_eq!(resp.to_string(), "<Response [200]>");
    }

    #[test]
    fn text_uses_declared_charset() {
        let resp = response(
            b"HTTP/1.1 200 OK\r\n",
            &["Content-Type: text/plain; charset=ISO-8859-1"],
            b"caf\xe9",
        );
        assert_eq!(resp.charset(), "ISO-8859-1");
        assert_eq!(resp.text(), "café");
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let resp = response(
            b"HTTP/1.1 200 OK\r\n",
            &["Content-Type: text/plain; charset=klingon"],
            "ok ✓".as_bytes(),
        );
        assert_eq!(resp.text(), "ok ✓");
    }

    #[test]
    fn json_accessor() {
        let resp = response(
            b"HTTP/1.1 200 OK\r\n",
            &["Content-Type: application/json"],
            br#"{"name":"x","n":[1,2]}"#,
        );
        assert!(resp.is_json());
        let value: Value = resp.json().unwrap();
        assert_eq!(value["n"][1], 2);

        let bad = response(b"HTTP/1.1 200 OK\r\n", &[], b"not json");
        assert!(matches!(bad.json::<Value>(), Err(Error::Json(_))));
    }

    #[test]
    fn missing_reason_is_empty() {
        let resp = response(b"HTTP/1.1 201\r\n", &[], b"");
        assert_eq!(resp.status_code(), 201);
        assert_eq!(resp.reason(), "");
        assert!(resp.is_success());
    }
}
