//! The I/O seam between the clients and the network.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and returns whatever came back.
//! It never turns a status code into an error and never retries; a failed
//! attempt surfaces once as `Error::Transport`. Redirects are not followed:
//! a 3xx comes back as-is with its `Location` header. `UreqTransport` is the
//! blocking implementation used outside of tests, bound to one base URL and
//! one global timeout for its whole life.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};

/// Largest response body read into memory.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Executes requests against a fixed origin.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent pools connections and is safe to share between threads.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    base_url: String,
    timeout: Duration,
}

impl UreqTransport {
    /// Any query or fragment on `base_url` is dropped; paths are appended
    /// to what remains.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        let base_url = base_url.split(['?', '#']).next().unwrap_or_default();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a request path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = self.url_for(&request.path);
        let body = request.body.as_ref().map(RequestBody::encode).transpose()?;
        debug!(method = %request.method, url = %url, "sending request");

        let result = match request.method {
            HttpMethod::Get => with_query(self.agent.get(&url), &request.query).call(),
            HttpMethod::Delete => with_query(self.agent.delete(&url), &request.query).call(),
            HttpMethod::Post => send(with_query(self.agent.post(&url), &request.query), body),
            HttpMethod::Patch => send(with_query(self.agent.patch(&url), &request.query), body),
        };

        let mut response = result.inspect_err(|e| {
            warn!(method = %request.method, url = %url, error = %e, "request failed");
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()?;
        debug!(method = %request.method, url = %url, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_query<B>(mut builder: RequestBuilder<B>, query: &[(String, String)]) -> RequestBuilder<B> {
    for (key, value) in query {
        builder = builder.query(key, value);
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<(String, Vec<u8>)>,
) -> std::result::Result<Response<Body>, ureq::Error> {
    match body {
        Some((content_type, bytes)) => builder
            .header("content-type", content_type.as_str())
            .send(&bytes[..]),
        None => builder.send_empty(),
    }
}
