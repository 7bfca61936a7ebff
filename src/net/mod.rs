//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! host, port, secure
//!     → connector.rs (resolve, non-blocking connect, connect deadline)
//!     → tls.rs (optional hostname-verified handshake)
//!     → connection.rs (single-owner stream, close-once, tracking)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Active → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - One connection per request attempt, never pooled or reused
//! - Every connection is tracked so leaks are observable
//! - TLS is optional and handled transparently behind one stream type

pub mod connection;
pub mod connector;
pub mod tls;

#[cfg(test)]
pub(crate) mod mock;

pub use connection::{Connection, ConnectionId, ConnectionState, ConnectionTracker};
pub use connector::{Connector, MaybeTlsStream, TcpConnector};
