//! Connection ownership and lifecycle tracking.
//!
//! # Responsibilities
//! - Own exactly one stream per request attempt
//! - Track connection state (Active → Draining → Closed)
//! - Guarantee the close routine runs at most once
//! - Generate unique connection IDs for tracing

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is open and owned by a request attempt.
    Active,
    /// Close has been requested and the write side is shutting down.
    Draining,
    /// Connection is closed.
    Closed,
}

/// Counts open connections across all requests of a client.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    /// Get current open connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements the open count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A single request attempt's stream.
///
/// Reads go through a buffered reader so the head parser can work line by
/// line; writes pass straight through. [`Connection::close`] shuts the stream
/// down once; later calls are no-ops. If the owning future is dropped before
/// `close` runs (timeout, cancellation) the stream is only dropped: the socket
/// is released without a shutdown, and TLS streams send no close_notify.
#[derive(Debug)]
pub struct Connection<S> {
    stream: BufReader<S>,
    state: ConnectionState,
    guard: ConnectionGuard,
    peer: String,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Take ownership of an established stream.
    pub fn new(stream: S, guard: ConnectionGuard, peer: impl Into<String>) -> Self {
        let peer = peer.into();
        tracing::trace!(connection_id = %guard.id(), peer = %peer, "Connection opened");
        Self {
            stream: BufReader::new(stream),
            state: ConnectionState::Active,
            guard,
            peer,
        }
    }

    /// This connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.guard.id()
    }

    /// Remote `host:port` this connection was opened to.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Buffered duplex stream for the protocol layers.
    pub fn stream(&mut self) -> &mut BufReader<S> {
        &mut self.stream
    }

    /// Write the whole buffer and flush.
    pub async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Shut the connection down. Only the first call touches the stream.
    pub async fn close(&mut self) {
        if self.state != ConnectionState::Active {
            return;
        }
        self.state = ConnectionState::Draining;
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(connection_id = %self.id(), error = %e, "Shutdown failed");
        }
        self.state = ConnectionState::Closed;
        tracing::trace!(connection_id = %self.id(), peer = %self.peer, "Connection closed");
    }
}

impl<S> Drop for Connection<S> {
    fn drop(&mut self) {
        if self.state != ConnectionState::Closed {
            tracing::debug!(
                connection_id = %self.guard.id(),
                peer = %self.peer,
                "Connection released without close"
            );
        }
    }
}
