//! Redirect controller: drives request attempts until a terminal response.
//!
//! # States
//! ```text
//! Attempt  ── head parsed ──▶ Decide
//! Decide   ── not following / not 301-303 / no Location / cap reached ──▶ Terminal
//! Decide   ── 301-303 with Location, below cap ──▶ Redirect
//! Redirect ── close connection, rewrite URL ──▶ Attempt
//! Terminal ── decode body, assemble Response ──▶ done
//! ```
//!
//! Reaching the cap while the server still redirects falls through to
//! `Terminal` and returns that redirect response, unless `strict` is set, in
//! which case it fails with `TooManyRedirects`.

use crate::error::ConnectionError;
use crate::http::body::BodyDecoder;
use crate::http::head::{read_head, ResponseHead};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::net::{Connection, ConnectionTracker, Connector};

/// Redirect following policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectPolicy {
    pub follow: bool,
    pub max_redirects: u32,
    pub strict: bool,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            follow: true,
            max_redirects: 2,
            strict: false,
        }
    }
}

/// Wire settings shared by every attempt.
#[derive(Debug, Clone)]
pub struct WireSettings {
    pub version: String,
    pub user_agent: String,
    pub decoder: BodyDecoder,
}

fn ignore_redirect() {}

enum State {
    Attempt,
    Decide(ResponseHead),
    Redirect(String),
    Terminal(ResponseHead),
}

/// Runs one request through connect, exchange, redirects and body decode.
pub struct Pipeline<'a, C> {
    connector: &'a C,
    tracker: &'a ConnectionTracker,
    wire: &'a WireSettings,
    policy: RedirectPolicy,
    on_redirect: &'a (dyn Fn() + Send + Sync),
}

impl<'a, C: Connector> Pipeline<'a, C> {
    pub fn new(
        connector: &'a C,
        tracker: &'a ConnectionTracker,
        wire: &'a WireSettings,
        policy: RedirectPolicy,
    ) -> Self {
        Self {
            connector,
            tracker,
            wire,
            policy,
            on_redirect: &ignore_redirect,
        }
    }

    /// Observe every followed redirect.
    pub fn on_redirect(mut self, f: &'a (dyn Fn() + Send + Sync)) -> Self {
        self.on_redirect = f;
        self
    }

    /// Execute the request. The active connection is closed exactly once on
    /// every path out of this function.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ConnectionError> {
        let mut conn: Option<Connection<C::Stream>> = None;
        let mut redirects: u32 = 0;
        let mut state = State::Attempt;

        let outcome = loop {
            state = match state {
                State::Attempt => {
                    let opened = match self.open(&request).await {
                        Ok(c) => conn.insert(c),
                        Err(e) => break Err(e),
                    };
                    match self.exchange(opened, &request).await {
                        Ok(head) => State::Decide(head),
                        Err(e) => break Err(e),
                    }
                }
                State::Decide(head) => match self.decide(head, redirects) {
                    Ok(next) => next,
                    Err(e) => break Err(e),
                },
                State::Redirect(location) => {
                    redirects += 1;
                    if let Some(mut c) = conn.take() {
                        c.close().await;
                    }
                    let next = match request.url.join(&location) {
                        Ok(url) => url,
                        Err(e) => break Err(e),
                    };
                    tracing::debug!(
                        from = %request.url,
                        to = %next,
                        redirects,
                        "Following redirect"
                    );
                    (self.on_redirect)();
                    request.url = next;
                    State::Attempt
                }
                State::Terminal(head) => {
                    let body = match conn.as_mut() {
                        Some(c) => {
                            self.wire
                                .decoder
                                .decode_for(c.stream(), &head, request.method)
                                .await
                        }
                        None => Ok(Default::default()),
                    };
                    break body.map(|body| Response::from_parts(head, request.url.clone(), body));
                }
            };
        };

        if let Some(mut c) = conn.take() {
            c.close().await;
        }
        outcome
    }

    async fn open(&self, request: &Request) -> Result<Connection<C::Stream>, ConnectionError> {
        let url = &request.url;
        let stream = self
            .connector
            .connect(url.host(), url.port(), url.is_secure())
            .await?;
        Ok(Connection::new(
            stream,
            self.tracker.track(),
            format!("{}:{}", url.host(), url.port()),
        ))
    }

    async fn exchange(
        &self,
        conn: &mut Connection<C::Stream>,
        request: &Request,
    ) -> Result<ResponseHead, ConnectionError> {
        let wire = request.encode(&self.wire.version, &self.wire.user_agent)?;
        conn.send(&wire).await?;
        tracing::debug!(
            connection_id = %conn.id(),
            method = %request.method,
            url = %request.url,
            bytes = wire.len(),
            "Request sent"
        );
        let head = read_head(conn.stream(), self.wire.decoder.max_line()).await?;
        tracing::debug!(
            connection_id = %conn.id(),
            status = head.status(),
            reason = %head.reason(),
            "Response head received"
        );
        Ok(head)
    }

    fn decide(&self, head: ResponseHead, redirects: u32) -> Result<State, ConnectionError> {
        if !self.policy.follow || !head.is_redirect() {
            return Ok(State::Terminal(head));
        }
        let Some(location) = head.location().map(str::to_string) else {
            tracing::debug!(status = head.status(), "Redirect status without Location");
            return Ok(State::Terminal(head));
        };
        if redirects >= self.policy.max_redirects {
            if self.policy.strict {
                return Err(ConnectionError::TooManyRedirects(redirects));
            }
            tracing::warn!(
                status = head.status(),
                location = %location,
                redirects,
                "Redirect cap reached, returning redirect response"
            );
            return Ok(State::Terminal(head));
        }
        Ok(State::Redirect(location))
    }
}
