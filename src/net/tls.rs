//! TLS client configuration and handshake.
//!
//! The handshake suspends the calling task until it completes; on slow links
//! that is the dominant share of connect latency and it is not bounded by
//! anything but the whole-request deadline.

use std::io;
use std::sync::{Arc, OnceLock};

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::error::ConnectionError;

static DEFAULT_CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

/// Client configuration trusting the webpki root set.
///
/// Built once per process and shared; every default client reuses it.
pub fn client_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    if let Some(config) = DEFAULT_CONFIG.get() {
        return Ok(Arc::clone(config));
    }
    let config = build_client_config()?;
    Ok(Arc::clone(DEFAULT_CONFIG.get_or_init(|| config)))
}

fn build_client_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(Arc::new(config))
}

/// Run the handshake over an established TCP stream, verifying `host`.
pub async fn handshake(
    config: Arc<ClientConfig>,
    host: &str,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, ConnectionError> {
    let server_name = ServerName::try_from(host.to_string()).map_err(|e| ConnectionError::Tls {
        host: host.to_string(),
        source: io::Error::new(io::ErrorKind::InvalidInput, e),
    })?;

    TlsConnector::from(config)
        .connect(server_name, stream)
        .await
        .map_err(|source| ConnectionError::Tls {
            host: host.to_string(),
            source,
        })
}
