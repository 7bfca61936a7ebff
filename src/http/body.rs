//! Response body decoding.
//!
//! Bodies are fully buffered. Every read asks for at most `buffer_size`
//! bytes. Any failure drops what was buffered so far; callers never see a
//! partial body.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncBufRead, AsyncReadExt};

use crate::error::ConnectionError;
use crate::http::head::{read_line_capped, Framing, ResponseHead, DEFAULT_MAX_LINE};
use crate::http::request::Method;

/// Default cap for a single read request.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Returns false for responses that never carry a body.
pub fn expects_body(method: Method, status: u16) -> bool {
    method != Method::Head && !(100..200).contains(&status) && status != 204 && status != 304
}

/// Decodes one response body according to its [`Framing`].
#[derive(Debug, Clone, Copy)]
pub struct BodyDecoder {
    buffer_size: usize,
    max_line: usize,
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl BodyDecoder {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            max_line: DEFAULT_MAX_LINE,
        }
    }

    /// Cap for response head and chunk-size lines.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line.max(1);
        self
    }

    pub fn max_line(&self) -> usize {
        self.max_line
    }

    /// Decode the body that follows `head`, honouring bodyless responses.
    pub async fn decode_for<R>(
        &self,
        reader: &mut R,
        head: &ResponseHead,
        method: Method,
    ) -> Result<Bytes, ConnectionError>
    where
        R: AsyncBufRead + Unpin,
    {
        if !expects_body(method, head.status()) {
            return Ok(Bytes::new());
        }
        self.decode(reader, head.framing()).await
    }

    /// Decode a body with the given framing.
    pub async fn decode<R>(&self, reader: &mut R, framing: Framing) -> Result<Bytes, ConnectionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let body = match framing {
            Framing::Chunked => self.read_chunked(reader).await?,
            Framing::Length(len) => {
                let len = usize::try_from(len).map_err(|_| {
                    ConnectionError::InvalidArgument(format!("content length {len} too large"))
                })?;
                self.read_exact_len(reader, len).await?
            }
            Framing::CloseDelimited => self.read_to_close(reader).await?,
        };
        tracing::trace!(framing = ?framing, bytes = body.len(), "Body decoded");
        Ok(body)
    }

    async fn read_chunked<R>(&self, reader: &mut R) -> Result<Bytes, ConnectionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut body = BytesMut::new();
        let mut scratch = vec![0u8; self.buffer_size];
        // Bytes still owed by the current chunk; zero between chunks.
        let mut chunk_size: usize = 0;

        loop {
            debug_assert_eq!(chunk_size, 0, "previous chunk not fully consumed");
            let mut line = Vec::new();
            match read_line_capped(reader, &mut line, self.max_line).await? {
                Some(0) => return Err(unexpected_eof("chunk size line")),
                Some(_) => {}
                None => {
                    return Err(ConnectionError::ChunkFraming(format!(
                        "chunk size line exceeds {} bytes",
                        self.max_line
                    )))
                }
            }
            chunk_size = parse_chunk_size(&line)?;

            if chunk_size == 0 {
                expect_crlf(reader, "after last chunk").await?;
                break;
            }

            while chunk_size > 0 {
                let want = chunk_size.min(scratch.len());
                let n = reader.read(&mut scratch[..want]).await?;
                if n == 0 {
                    return Err(unexpected_eof("chunk data"));
                }
                body.extend_from_slice(&scratch[..n]);
                chunk_size -= n;
            }
            expect_crlf(reader, "after chunk data").await?;
        }

        debug_assert_eq!(chunk_size, 0);
        Ok(body.freeze())
    }

    async fn read_exact_len<R>(&self, reader: &mut R, len: usize) -> Result<Bytes, ConnectionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut body = BytesMut::with_capacity(len.min(self.buffer_size * 16));
        let mut scratch = vec![0u8; self.buffer_size.min(len.max(1))];
        let mut residual = len;

        while residual > 0 {
            let want = residual.min(scratch.len());
            let n = reader.read(&mut scratch[..want]).await?;
            if n == 0 {
                return Err(unexpected_eof(&format!(
                    "body after {} of {len} bytes",
                    len - residual
                )));
            }
            body.extend_from_slice(&scratch[..n]);
            residual -= n;
        }
        Ok(body.freeze())
    }

    async fn read_to_close<R>(&self, reader: &mut R) -> Result<Bytes, ConnectionError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut body = BytesMut::new();
        let mut scratch = vec![0u8; self.buffer_size];
        loop {
            let n = reader.read(&mut scratch).await?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&scratch[..n]);
        }
        Ok(body.freeze())
    }
}

/// Parse a chunk-size line, dropping any `;extension`.
fn parse_chunk_size(line: &[u8]) -> Result<usize, ConnectionError> {
    let text = String::from_utf8_lossy(line);
    let size = text.split(';').next().unwrap_or_default().trim();
    usize::from_str_radix(size, 16)
        .map_err(|_| ConnectionError::ChunkFraming(format!("invalid chunk size {size:?}")))
}

async fn expect_crlf<R>(reader: &mut R, context: &str) -> Result<(), ConnectionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut sep = [0u8; 2];
    reader.read_exact(&mut sep).await?;
    if &sep != b"\r\n" {
        return Err(ConnectionError::ChunkFraming(format!(
            "expected CRLF {context}, got {sep:?}"
        )));
    }
    Ok(())
}

fn unexpected_eof(what: &str) -> ConnectionError {
    ConnectionError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("stream ended while reading {what}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn decode(input: &[u8], framing: Framing, buffer_size: usize) -> Result<Bytes, ConnectionError> {
        let mut reader = BufReader::new(input);
        BodyDecoder::new(buffer_size).decode(&mut reader, framing).await
    }

    #[tokio::test]
    async fn wikipedia_chunks() {
        let body = decode(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n", Framing::Chunked, 4096)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Wikipedia");
    }

    #[tokio::test]
    async fn chunks_larger_than_buffer() {
        let payload = vec![b'x'; 10_000];
        let mut wire = format!("{:x};name=value\r\n", payload.len()).into_bytes();
        wire.extend_from_slice(&payload);
        wire.extend_from_slice(b"\r\n3\r\nabc\r\n0\r\n\r\n");

        let body = decode(&wire, Framing::Chunked, 1000).await.unwrap();
        assert_eq!(body.len(), 10_003);
        assert!(body.ends_with(b"xabc"));
    }

    #[tokio::test]
    async fn zero_chunk_stops_reading() {
        let mut reader = BufReader::new(&b"3\r\nabc\r\n0\r\n\r\nff\r\ntrailing"[..]);
        let body = BodyDecoder::default()
            .decode(&mut reader, Framing::Chunked)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abc");

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"ff\r\ntrailing");
    }

    #[tokio::test]
    async fn bad_terminal_trailer_is_fatal() {
        let err = decode(b"0\r\nX-Trailer: 1\r\n\r\n", Framing::Chunked, 4096)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::ChunkFraming(_)));
    }

    #[tokio::test]
    async fn bad_chunk_separator_is_fatal() {
        let err = decode(b"3\r\nabcd\r\n0\r\n\r\n", Framing::Chunked, 4096)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::ChunkFraming(_)));
    }

    #[tokio::test]
    async fn invalid_chunk_size() {
        let err = decode(b"zz\r\n", Framing::Chunked, 4096).await.unwrap_err();
        assert!(matches!(err, ConnectionError::ChunkFraming(_)));
    }

    #[tokio::test]
    async fn truncated_chunk_is_error() {
        let err = decode(b"a\r\nabc", Framing::Chunked, 4096).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Io(_)));
    }

    #[tokio::test]
    async fn length_bounded_reads_exactly() {
        for len in [0usize, 1, 4095, 4096, 4097, 20_000] {
            let mut wire = vec![b'a'; len];
            wire.extend_from_slice(b"EXTRA");
            let body = decode(&wire, Framing::Length(len as u64), 4096).await.unwrap();
            assert_eq!(body.len(), len);
            assert!(body.iter().all(|&b| b == b'a'));
        }
    }

    #[tokio::test]
    async fn short_length_body_is_error() {
        let err = decode(b"hel", Framing::Length(5), 4096).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[tokio::test]
    async fn close_delimited_reads_to_end() {
        let body = decode(b"all of it", Framing::CloseDelimited, 2).await.unwrap();
        assert_eq!(&body[..], b"all of it");
    }

    #[tokio::test]
    async fn overlong_chunk_size_line_is_fatal() {
        let mut input = b"1".to_vec();
        input.extend(std::iter::repeat(b'0').take(100));
        let mut reader = BufReader::new(&input[..]);
        let err = BodyDecoder::new(16)
            .with_max_line(32)
            .decode(&mut reader, Framing::Chunked)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::ChunkFraming(_)));
    }

    #[test]
    fn bodyless_responses() {
        assert!(!expects_body(Method::Head, 200));
        assert!(!expects_body(Method::Get, 204));
        assert!(!expects_body(Method::Get, 304));
        assert!(!expects_body(Method::Get, 100));
        assert!(expects_body(Method::Get, 200));
        assert!(expects_body(Method::Post, 302));
    }
}
