//! Status line and header block parsing.
//!
//! Header lines are kept verbatim for the response's header mapping and
//! classified once, in a single pass, into the facts the body decoder and
//! the redirect controller need.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::ConnectionError;

/// Charset assumed when `Content-Type` does not name one.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Default cap for one status, header or chunk-size line, terminator included.
pub const DEFAULT_MAX_LINE: usize = 8192;

/// How the response body is delimited. Exactly one applies per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// `Transfer-Encoding: chunked`.
    Chunked,
    /// `Content-Length: n`.
    Length(u64),
    /// Neither header: the body runs until the server closes the stream.
    CloseDelimited,
}

/// Facts derived from a header block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub framing: Framing,
    pub charset: String,
    pub json: bool,
    pub location: Option<String>,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            framing: Framing::CloseDelimited,
            charset: DEFAULT_CHARSET.to_string(),
            json: false,
            location: None,
        }
    }
}

/// Classify raw header lines.
///
/// Names compare case-insensitively and the first matching marker wins per
/// line. Lines without a colon, or with an unusable `Content-Length`, are
/// ignored here.
pub fn classify<'a, I>(lines: I) -> Classification
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut chunked = false;
    let mut content_length: Option<u64> = None;
    let mut class = Classification::default();

    for raw in lines {
        let line = String::from_utf8_lossy(raw);
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case("transfer-encoding") {
            if value.to_ascii_lowercase().contains("chunked") {
                chunked = true;
            }
        } else if name.eq_ignore_ascii_case("location") {
            class.location = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("content-length") {
            if !chunked {
                if let Ok(n) = value.parse() {
                    content_length = Some(n);
                }
            }
        } else if name.eq_ignore_ascii_case("content-type") {
            let lower = value.to_ascii_lowercase();
            if lower.contains("application/json") {
                class.json = true;
            }
            if lower.contains("charset") {
                if let Some(charset) = value.rsplit('=').next() {
                    let charset = charset.trim().trim_matches('"');
                    if !charset.is_empty() {
                        class.charset = charset.to_string();
                    }
                }
            }
        }
    }

    class.framing = match (chunked, content_length) {
        (true, _) => Framing::Chunked,
        (false, Some(n)) => Framing::Length(n),
        (false, None) => Framing::CloseDelimited,
    };
    class
}

/// Parsed status line and header block of one response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    version: String,
    status: u16,
    reason: String,
    lines: Vec<Vec<u8>>,
    class: Classification,
}

impl ResponseHead {
    /// Build a head from a status line and raw header lines.
    pub fn from_parts(status_line: &[u8], lines: Vec<Vec<u8>>) -> Result<Self, ConnectionError> {
        let (version, status, reason) = parse_status_line(status_line)?;
        let class = classify(lines.iter().map(Vec::as_slice));
        Ok(Self {
            version,
            status,
            reason,
            lines,
            class,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase; empty when the server sent none.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Header lines exactly as received, line endings included.
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    pub fn classification(&self) -> &Classification {
        &self.class
    }

    pub fn framing(&self) -> Framing {
        self.class.framing
    }

    pub fn charset(&self) -> &str {
        &self.class.charset
    }

    pub fn is_json(&self) -> bool {
        self.class.json
    }

    pub fn location(&self) -> Option<&str> {
        self.class.location.as_deref()
    }

    pub fn is_redirect(&self) -> bool {
        (301..=303).contains(&self.status)
    }
}

/// Split `HTTP/1.1 200 OK` into version, code and optional reason.
pub fn parse_status_line(line: &[u8]) -> Result<(String, u16, String), ConnectionError> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    let malformed = || ConnectionError::StatusLine(text.to_string());

    let (version, rest) = text.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let rest = rest.trim_start();
    let (code, reason) = match rest.split_once(char::is_whitespace) {
        Some((code, reason)) => (code, reason.trim()),
        None => (rest, ""),
    };
    let status = code.parse::<u16>().map_err(|_| malformed())?;

    Ok((version.to_string(), status, reason.to_string()))
}

/// Read one line of at most `limit` bytes into `buf`.
///
/// Returns `None` if `limit` bytes arrived without a newline. A final line
/// cut short by end of stream is returned as is.
pub(crate) async fn read_line_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
) -> io::Result<Option<usize>>
where
    R: AsyncBufRead + Unpin,
{
    let n = (&mut *reader).take(limit as u64).read_until(b'\n', buf).await?;
    if n >= limit && buf.last() != Some(&b'\n') {
        return Ok(None);
    }
    Ok(Some(n))
}

/// Read the status line and header block, stopping at the blank line or EOF.
/// Any line longer than `max_line` fails with `HeadLineTooLong`.
pub async fn read_head<R>(reader: &mut R, max_line: usize) -> Result<ResponseHead, ConnectionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut status_line = Vec::new();
    if read_line_capped(reader, &mut status_line, max_line).await?.is_none() {
        return Err(ConnectionError::HeadLineTooLong(max_line));
    }

    let mut lines = Vec::new();
    loop {
        let mut line = Vec::new();
        let Some(n) = read_line_capped(reader, &mut line, max_line).await? else {
            return Err(ConnectionError::HeadLineTooLong(max_line));
        };
        if n == 0 || line == b"\r\n" || line == b"\n" {
            break;
        }
        lines.push(line);
    }

    let head = ResponseHead::from_parts(&status_line, lines)?;
    tracing::trace!(
        status = head.status(),
        framing = ?head.framing(),
        headers = head.lines().len(),
        "Response head parsed"
    );
    Ok(head)
}
