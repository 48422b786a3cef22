//! Cache interception points around dispatch.
//!
//! A hook sees every request before it is sent and may answer it from its
//! own store through `lookup`. A lookup hit is returned as-is: the transport
//! is skipped and neither `on_success` nor `on_failure` runs. Keying is up to
//! the hook; `HttpRequest::fingerprint` is one option.

use std::fmt;

use bytes::Bytes;

use crate::http::HttpRequest;

pub trait CacheHook: fmt::Debug + Send + Sync {
    /// Notification only.
    fn before_send(&self, _request: &HttpRequest) {}

    /// Cached body for `request`, if any.
    fn lookup(&self, _request: &HttpRequest) -> Option<Bytes> {
        None
    }

    /// Body of a 2xx response.
    fn on_success(&self, _body: &Bytes) {}

    /// Body of any non-2xx response.
    fn on_failure(&self, _request: &HttpRequest, _body: &Bytes) {}
}

/// Hook that does nothing. The `Client` default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheHook for NoCache {}
