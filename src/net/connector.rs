//! Outbound connection establishment.
//!
//! # Responsibilities
//! - Resolve the host and connect to its first address
//! - Bound resolve + connect by the connect deadline
//! - Upgrade to TLS when the URL scheme asks for it

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{lookup_host, TcpStream};
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::ClientConfig;

use crate::error::ConnectionError;
use crate::net::tls;

/// Opens byte streams to `host:port`.
///
/// The client is generic over this so the protocol layers can be driven by
/// in-memory streams.
pub trait Connector: Send + Sync {
    /// Duplex stream produced by a successful connect.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect, upgrading to TLS when `secure` is set.
    fn connect(
        &self,
        host: &str,
        port: u16,
        secure: bool,
    ) -> impl Future<Output = Result<Self::Stream, ConnectionError>> + Send;
}

/// Plain TCP or TLS-over-TCP stream.
#[derive(Debug)]
pub enum MaybeTlsStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_flush(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            MaybeTlsStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Connector backed by tokio sockets and rustls.
#[derive(Clone)]
pub struct TcpConnector {
    tls: Arc<ClientConfig>,
    connect_timeout: Duration,
}

impl TcpConnector {
    /// Create a connector with the default root store.
    pub fn new(connect_timeout: Duration) -> Result<Self, ConnectionError> {
        let tls = tls::client_config().map_err(|e| ConnectionError::Tls {
            host: String::new(),
            source: io::Error::other(e),
        })?;
        Ok(Self::with_tls_config(tls, connect_timeout))
    }

    /// Create a connector with a caller-built TLS configuration.
    pub fn with_tls_config(tls: Arc<ClientConfig>, connect_timeout: Duration) -> Self {
        Self {
            tls,
            connect_timeout,
        }
    }

    async fn open_tcp(&self, host: &str, port: u16) -> Result<TcpStream, ConnectionError> {
        let addr = lookup_host((host, port))
            .await
            .map_err(|source| ConnectionError::Resolve {
                host: host.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| ConnectionError::Resolve {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses"),
            })?;

        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ConnectionError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;

        tracing::debug!(host = %host, addr = %addr, "TCP connection established");
        Ok(stream)
    }
}

impl std::fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnector")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl Connector for TcpConnector {
    type Stream = MaybeTlsStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        secure: bool,
    ) -> Result<MaybeTlsStream, ConnectionError> {
        let stream = tokio::time::timeout(self.connect_timeout, self.open_tcp(host, port))
            .await
            .map_err(|_| ConnectionError::ConnectTimeout(format!("{host}:{port}")))??;

        if !secure {
            return Ok(MaybeTlsStream::Plain(stream));
        }

        let tls = tls::handshake(Arc::clone(&self.tls), host, stream).await?;
        tracing::debug!(host = %host, "TLS handshake complete");
        Ok(MaybeTlsStream::Tls(Box::new(tls)))
    }
}
