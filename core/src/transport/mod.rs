//! Transport collaborators.
//!
//! A transport executes one `HttpRequest` and hands back the status, headers
//! and body as data. It never interprets the status code: 4xx and 5xx
//! responses are returned as `Ok`, and redirects are not followed.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

#[cfg(feature = "reqwest")]
pub mod reqwest_backend;
#[cfg(feature = "ureq")]
pub mod ureq_backend;

#[cfg(feature = "reqwest")]
pub use reqwest_backend::ReqwestTransport;
#[cfg(feature = "ureq")]
pub use ureq_backend::UreqTransport;

/// Non-blocking transport used by `Client`.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport used by `BlockingClient`.
pub trait BlockingTransport: std::fmt::Debug + Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Async transport behind a `BlockingClient::new` client. Every send fails.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Unconfigured;

#[async_trait]
impl Transport for Unconfigured {
    async fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Other("no transport configured".to_string()))
    }
}
