//! Fakes shared by unit tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use crate::cache::CacheHook;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse, Params};
use crate::transport::{BlockingTransport, Transport};

pub(crate) const BASE_URL: &str = "http://localhost:3000";

pub(crate) fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

type Reply = Box<dyn Fn() -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Transport answering every request with the same reply and recording what
/// it was sent.
pub(crate) struct FakeTransport {
    reply: Reply,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn respond(status: u16, body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Ok(HttpResponse::new(status, body))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn fail(err: impl Fn() -> TransportError + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(move || Err(err())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn answer(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.reply)()
    }
}

impl fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTransport")
            .field("calls", &self.calls())
            .finish()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.answer(request)
    }
}

impl BlockingTransport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.answer(request)
    }
}

/// Cache hook counting every call, optionally answering lookups.
#[derive(Debug, Default)]
pub(crate) struct RecordingCache {
    cached: Option<Bytes>,
    pub(crate) before_send: AtomicUsize,
    pub(crate) lookups: AtomicUsize,
    pub(crate) successes: AtomicUsize,
    pub(crate) failures: AtomicUsize,
}

impl RecordingCache {
    pub(crate) fn new(cached: Option<Bytes>) -> Arc<Self> {
        Arc::new(Self {
            cached,
            ..Self::default()
        })
    }
}

impl CacheHook for RecordingCache {
    fn before_send(&self, _request: &HttpRequest) {
        self.before_send.fetch_add(1, Ordering::SeqCst);
    }

    fn lookup(&self, _request: &HttpRequest) -> Option<Bytes> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.cached.clone()
    }

    fn on_success(&self, _body: &Bytes) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_failure(&self, _request: &HttpRequest, _body: &Bytes) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}
