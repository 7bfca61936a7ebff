//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client pipeline produces:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → any tracing subscriber (fmt layer installed by logging::init)
//!     → any metrics recorder the embedding program installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the binary's job
//! - Request ID flows through every event of a request via its span

pub mod logging;
pub mod metrics;
