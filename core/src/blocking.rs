//! Blocking delivery over the same build/classify pipeline as `Client`.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info_span, Span};

use crate::auth::AuthProvider;
use crate::cache::CacheHook;
use crate::client::Client;
use crate::error::ApiError;
use crate::http::{ContentMode, HttpMethod, HttpRequest, Params};
use crate::transport::{BlockingTransport, Unconfigured};

/// Synchronous client. Uses the wrapped `Client` for configuration,
/// request building and classification, and `transport` for I/O.
#[derive(Debug, Clone)]
pub struct BlockingClient {
    client: Client,
    transport: Arc<dyn BlockingTransport>,
}

impl BlockingClient {
    /// Blocking client for `base_url` with no default headers, auth or cache
    /// hook. Configure it with the `with_*` derivations.
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn BlockingTransport>) -> Self {
        Self::from_client(Client::new(base_url, Arc::new(Unconfigured)), transport)
    }

    /// Blocking view sharing `client`'s configuration. Its async transport is
    /// never used.
    pub(crate) fn from_client(client: Client, transport: Arc<dyn BlockingTransport>) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn with_default_headers(&self, headers: Params) -> Self {
        self.derive(self.client.with_default_headers(headers))
    }

    pub fn with_default_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.derive(self.client.with_default_header(name, value))
    }

    pub fn with_content_mode(&self, mode: ContentMode) -> Self {
        self.derive(self.client.with_content_mode(mode))
    }

    pub fn with_auth(&self, auth: Arc<dyn AuthProvider>) -> Self {
        self.derive(self.client.with_auth(auth))
    }

    pub fn with_cache_hook(&self, cache: Arc<dyn CacheHook>) -> Self {
        self.derive(self.client.with_cache_hook(cache))
    }

    pub fn with_transport(&self, transport: Arc<dyn BlockingTransport>) -> Self {
        Self::from_client(self.client.clone(), transport)
    }

    fn derive(&self, client: Client) -> Self {
        Self::from_client(client, Arc::clone(&self.transport))
    }

    pub fn get(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Get, path, query, headers, None)
    }

    pub fn post(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Post, path, query, headers, body)
    }

    pub fn put(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Put, path, query, headers, body)
    }

    pub fn patch(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Patch, path, query, headers, body)
    }

    pub fn delete(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Delete, path, query, headers, None)
    }

    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        let request = self.client.build_request(method, path, query, headers, body)?;
        self.send(&request)
    }

    pub fn send(&self, request: &HttpRequest) -> Result<Option<Bytes>, ApiError> {
        let span = info_span!(
            "api_request",
            http.method = %request.method(),
            http.url = %request.url(),
            http.status_code = tracing::field::Empty,
        );
        let _guard = span.enter();

        if let Some(cached) = self.client.begin(request) {
            return Ok(Some(cached));
        }
        let response = self.transport.send(request)?;
        Span::current().record("http.status_code", response.status);
        self.client.parse_response(request, response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::auth::HeaderAuth;
    use crate::error::TransportError;
    use crate::testing::{params, FakeTransport, RecordingCache, BASE_URL};

    fn blocking(transport: Arc<FakeTransport>, cache: Arc<RecordingCache>) -> BlockingClient {
        BlockingClient::new(BASE_URL, transport).with_cache_hook(cache)
    }

    #[test]
    fn classifies_like_the_async_client() {
        let cases: [(u16, fn(&Result<Option<Bytes>, ApiError>) -> bool); 4] = [
            (200, |r| matches!(r, Ok(Some(_)))),
            (302, |r| matches!(r, Ok(None))),
            (422, |r| matches!(r, Err(ApiError::ClientError { status: 422, .. }))),
            (500, |r| matches!(r, Err(ApiError::ServerError { status: 500, .. }))),
        ];
        for (status, check) in cases {
            let cache = RecordingCache::new(None);
            let client = blocking(FakeTransport::respond(status, "{}"), cache.clone());
            let result = client.get("/", &Params::new(), &Params::new());
            assert!(check(&result), "status {status}: {result:?}");

            let expected_failures = usize::from(status != 200);
            assert_eq!(
                cache.failures.load(Ordering::SeqCst),
                expected_failures,
                "status {status}"
            );
        }
    }

    #[test]
    fn cache_hit_skips_transport() {
        let transport = FakeTransport::respond(200, "fresh");
        let cache = RecordingCache::new(Some(Bytes::from_static(b"cached")));
        let client = blocking(transport.clone(), cache.clone());

        let body = client.get("/", &Params::new(), &Params::new()).unwrap();

        assert_eq!(body, Some(Bytes::from_static(b"cached")));
        assert_eq!(transport.calls(), 0);
        assert_eq!(cache.successes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn transport_timeout_is_a_network_error() {
        let client = blocking(
            FakeTransport::fail(|| TransportError::Timeout),
            RecordingCache::new(None),
        );
        let err = client
            .delete("/api/posts/1", &Params::new(), &Params::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn standalone_client_is_configured_by_derivation() {
        let transport = FakeTransport::respond(200, "{}");
        let base = BlockingClient::new(BASE_URL, transport.clone());
        let configured = base
            .with_default_header("X-Client", "restkit")
            .with_content_mode(ContentMode::Json)
            .with_auth(Arc::new(HeaderAuth::bearer("secret")));

        configured
            .put(
                "/api/posts/1",
                &params(&[("page", "2")]),
                &Params::new(),
                Some(Bytes::from_static(b"{\"title\":\"x\"}")),
            )
            .unwrap();

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.method(), HttpMethod::Put);
        assert_eq!(sent.url().as_str(), "http://localhost:3000/api/posts/1?page=2");
        assert_eq!(sent.header("authorization"), Some("Bearer secret"));
        assert_eq!(sent.header("x-client"), Some("restkit"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.body().map(|b| b.as_ref()), Some(&b"{\"title\":\"x\"}"[..]));
        assert!(base.client().default_headers().is_empty());
    }

    #[test]
    fn derived_view_shares_the_async_configuration() {
        let transport = FakeTransport::respond(200, "");
        let async_client = Client::new(BASE_URL, FakeTransport::respond(500, ""))
            .with_default_header("X-Client", "restkit");

        async_client
            .blocking(transport.clone())
            .get("/", &Params::new(), &Params::new())
            .unwrap();

        assert_eq!(transport.last_request().unwrap().header("x-client"), Some("restkit"));
    }

    #[test]
    fn with_transport_swaps_only_the_transport() {
        let first = FakeTransport::respond(200, "");
        let second = FakeTransport::respond(200, "");
        let client = BlockingClient::new(BASE_URL, first.clone()).with_default_header("A", "1");

        client
            .with_transport(second.clone())
            .get("/", &Params::new(), &Params::new())
            .unwrap();

        assert_eq!(first.calls(), 0);
        assert_eq!(second.last_request().unwrap().header("a"), Some("1"));
    }
}
