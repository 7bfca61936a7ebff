//! In-memory streams for exercising the pipeline without sockets.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::error::ConnectionError;
use crate::net::connector::Connector;

/// Observes what happened to a [`MockStream`] after it was handed away.
#[derive(Debug, Default)]
pub(crate) struct Tap {
    shutdowns: AtomicUsize,
    written: Mutex<Vec<u8>>,
}

impl Tap {
    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub(crate) fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

/// Serves canned bytes, optionally failing once `fail_at` bytes were read.
#[derive(Debug)]
pub(crate) struct MockStream {
    input: Vec<u8>,
    pos: usize,
    fail_at: Option<usize>,
    tap: Arc<Tap>,
}

impl MockStream {
    pub(crate) fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            pos: 0,
            fail_at: None,
            tap: Arc::default(),
        }
    }

    /// Fail every read after `offset` bytes have been delivered.
    pub(crate) fn failing_at(mut self, offset: usize) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub(crate) fn tap(&self) -> Arc<Tap> {
        Arc::clone(&self.tap)
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let limit = this.fail_at.unwrap_or(this.input.len()).min(this.input.len());
        if this.pos >= limit && this.fail_at.is_some() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by mock",
            )));
        }
        let n = (limit - this.pos).min(buf.remaining());
        buf.put_slice(&this.input[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.tap.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.tap.shutdowns.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}

/// Hands out one scripted stream per connect, in order.
#[derive(Debug, Default)]
pub(crate) struct MockConnector {
    streams: Mutex<VecDeque<MockStream>>,
    taps: Mutex<Vec<Arc<Tap>>>,
    targets: Mutex<Vec<(String, u16, bool)>>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a stream answering with `response`.
    pub(crate) fn respond(self, response: impl Into<Vec<u8>>) -> Self {
        self.push(MockStream::new(response))
    }

    pub(crate) fn push(self, stream: MockStream) -> Self {
        self.taps.lock().unwrap().push(stream.tap());
        self.streams.lock().unwrap().push_back(stream);
        self
    }

    pub(crate) fn taps(&self) -> Vec<Arc<Tap>> {
        self.taps.lock().unwrap().clone()
    }

    pub(crate) fn targets(&self) -> Vec<(String, u16, bool)> {
        self.targets.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    type Stream = MockStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        secure: bool,
    ) -> Result<MockStream, ConnectionError> {
        self.targets
            .lock()
            .unwrap()
            .push((host.to_string(), port, secure));
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ConnectionError::Connect {
                addr: format!("{host}:{port}"),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "no scripted stream"),
            })
    }
}
