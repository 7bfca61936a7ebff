//! HTTP/1.x protocol subsystem.
//!
//! # Data Flow
//! ```text
//! Request (method, url, headers, body)
//!     → request.rs (encode request line, headers, body)
//!     → [net: write to connection]
//!     → head.rs (status line, header lines, classification)
//!     → redirect.rs (follow 301-303 up to the cap)
//!     → body.rs (chunked / length-bounded / close-delimited decode)
//!     → response.rs (header mapping, text, json)
//! ```

pub mod body;
pub mod head;
pub mod headers;
pub mod redirect;
pub mod request;
pub mod response;
pub mod url;

pub use body::BodyDecoder;
pub use head::{Classification, Framing, ResponseHead};
pub use headers::Headers;
pub use redirect::{Pipeline, RedirectPolicy, WireSettings};
pub use request::{Body, Method, Request};
pub use response::Response;
pub use url::{Scheme, Url};
