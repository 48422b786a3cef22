//! ureq-based blocking transport

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tracing::trace;
use ureq::typestate::WithBody;

use super::BlockingTransport;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Params};

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent returns 4xx/5xx responses as data and does not follow redirects.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl BlockingTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url().as_str();
        let result = match request.method() {
            HttpMethod::Get => with_headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => {
                send_body(with_headers(self.agent.post(url), request), request.body())
            }
            HttpMethod::Put => {
                send_body(with_headers(self.agent.put(url), request), request.body())
            }
            HttpMethod::Patch => {
                send_body(with_headers(self.agent.patch(url), request), request.body())
            }
        };
        let mut response = result.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers: Params = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // No size cap, matching `ReqwestTransport`.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(TransportError::from)?;
        trace!(status, len = body.len(), "ureq response");

        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body),
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<WithBody>,
    body: Option<&Bytes>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_ref()),
        None => builder.send_empty(),
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                TransportError::Connection(err.to_string())
            }
            ureq::Error::Io(io) => TransportError::Connection(io.to_string()),
            ureq::Error::Protocol(_) => TransportError::InvalidResponse(err.to_string()),
            other => TransportError::Other(other.to_string()),
        }
    }
}
