//! Client subsystem: verb entry points over the request pipeline.
//!
//! # Data Flow
//! ```text
//! get/head/post/put/delete(url, RequestOptions)
//!     → options.rs (params, headers, body, redirects, timeout)
//!     → http::redirect::Pipeline (connect, exchange, redirects, body)
//!     → resilience::timeouts (whole-operation deadline)
//!     → hooks.rs (memory hook after every request)
//!     → Response | Error::{Connection, Timeout}
//! ```

pub mod hooks;
pub mod options;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;
use uuid::Uuid;

pub use hooks::{MemoryHook, NoopHook};
pub use options::{LegacyOption, RequestOptions};

use crate::config::{validate_config, ClientConfig};
use crate::error::{ConnectionError, Error, Result};
use crate::http::body::BodyDecoder;
use crate::http::redirect::{Pipeline, RedirectPolicy, WireSettings};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::url::Url;
use crate::net::{ConnectionTracker, Connector, TcpConnector};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// HTTP/1.x client. Cheap to share by reference; holds no connections
/// between requests.
pub struct Client<C = TcpConnector> {
    config: Arc<ClientConfig>,
    connector: C,
    tracker: ConnectionTracker,
    wire: WireSettings,
    hook: Arc<dyn MemoryHook>,
}

impl Client<TcpConnector> {
    /// Create a client that connects over TCP, with TLS for `https`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let connector =
            TcpConnector::new(Duration::from_secs(config.timeouts.connect_secs))?;
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> Client<C> {
    /// Create a client over a custom transport.
    pub fn with_connector(config: ClientConfig, connector: C) -> Result<Self> {
        validate_config(&config).map_err(|errors| {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            ConnectionError::InvalidArgument(format!("invalid client config: {joined}"))
        })?;

        let wire = WireSettings {
            version: config.http.version.clone(),
            user_agent: config.http.user_agent.clone(),
            decoder: BodyDecoder::new(config.transport.read_buffer_size)
                .with_max_line(config.transport.max_line_length),
        };
        Ok(Self {
            config: Arc::new(config),
            connector,
            tracker: ConnectionTracker::new(),
            wire,
            hook: Arc::new(NoopHook),
        })
    }

    /// Install the hook invoked after every request.
    pub fn with_memory_hook(mut self, hook: impl MemoryHook + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connections currently open. Zero whenever no request is in flight.
    pub fn open_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Get, url, options).await
    }

    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Head, url, options).await
    }

    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Post, url, options).await
    }

    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Put, url, options).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::Delete, url, options).await
    }

    /// Issue one request, following redirects, under the whole-operation
    /// deadline.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let start = Instant::now();
        let span = tracing::info_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %method,
            url = %url,
        );

        let result = self
            .run(method, url, options)
            .instrument(span.clone())
            .await;
        self.hook.after_request();

        let _entered = span.enter();
        match &result {
            Ok(response) => {
                tracing::info!(
                    status = response.status_code(),
                    final_url = %response.url(),
                    bytes = response.content().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request completed"
                );
                if self.config.observability.metrics_enabled {
                    metrics::record_request(method.as_str(), response.status_code(), start);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Request failed");
                if self.config.observability.metrics_enabled {
                    let kind = match e {
                        Error::Connection(cause) => cause.kind(),
                        Error::Timeout(_) => "timeout",
                        Error::Json(_) => "json",
                    };
                    metrics::record_error(method.as_str(), kind, start);
                }
            }
        }
        result
    }

    async fn run(&self, method: Method, url: &str, options: RequestOptions) -> Result<Response> {
        options.log_ignored();

        let url = Url::parse(url)?.with_params(&options.params);
        let deadline = options
            .timeout
            .unwrap_or(Duration::from_secs(self.config.timeouts.request_secs));
        let policy = RedirectPolicy {
            follow: options.allow_redirects,
            max_redirects: self.config.redirects.max_redirects,
            strict: self.config.redirects.strict,
        };
        let request = Request::new(method, url, options.headers, options.data, options.json)?;

        let metrics_enabled = self.config.observability.metrics_enabled;
        let on_redirect = move || {
            if metrics_enabled {
                metrics::record_redirect();
            }
        };
        let pipeline =
            Pipeline::new(&self.connector, &self.tracker, &self.wire, policy).on_redirect(&on_redirect);

        with_deadline(deadline, pipeline.execute(request)).await
    }
}

impl<C> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("open_connections", &self.tracker.active_count())
            .finish_non_exhaustive()
    }
}

/// One-shot request with a default client.
pub async fn request(method: Method, url: &str, options: RequestOptions) -> Result<Response> {
    Client::new(ClientConfig::default())?
        .request(method, url, options)
        .await
}

/// `GET` with a default client.
pub async fn get(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Get, url, options).await
}

/// `HEAD` with a default client.
pub async fn head(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Head, url, options).await
}

/// `POST` with a default client.
pub async fn post(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Post, url, options).await
}

/// `PUT` with a default client.
pub async fn put(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Put, url, options).await
}

/// `DELETE` with a default client.
pub async fn delete(url: &str, options: RequestOptions) -> Result<Response> {
    request(Method::Delete, url, options).await
}
