//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request pipeline:
//!     → timeouts.rs (whole-operation deadline around connect, redirects, body)
//! ```
//!
//! # Design Decisions
//! - Every request has a deadline
//! - Timeout errors are distinct from connection errors
//! - No retries: a failed attempt is reported, not repeated

pub mod timeouts;
