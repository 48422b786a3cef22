//! Request dispatch and response classification.
//!
//! # Design
//! `Client` holds only immutable configuration: base URL, default headers,
//! content mode and three shared collaborators (auth provider, cache hook,
//! transport). Every `with_*` method returns a derived client and leaves the
//! original untouched, so one client can be shared across tasks freely.
//!
//! Dispatch is split into three steps that every delivery mode composes:
//! - `build_request` resolves the logical request into an `HttpRequest`
//! - `begin` notifies the cache hook and asks it for a cached body
//! - `parse_response` classifies the transport's answer and fires the
//!   success or failure hook
//!
//! Client (4xx) and server (5xx) errors fail the call. Informational,
//! redirection and unclassified statuses still fire the failure hook but
//! resolve to `Ok(None)`.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::{AbortRegistration, Abortable};
use futures::stream::{self, Stream};
use tracing::{debug, instrument, Span};

use crate::auth::{AuthProvider, NoAuth};
use crate::blocking::BlockingClient;
use crate::cache::{CacheHook, NoCache};
use crate::error::ApiError;
use crate::http::{ContentMode, HttpMethod, HttpRequest, HttpResponse, Params};
use crate::request::RequestBuilder;
use crate::status::StatusClass;
use crate::transport::{BlockingTransport, Transport};

/// Async client for a single API host.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    default_headers: Params,
    content_mode: Option<ContentMode>,
    auth: Arc<dyn AuthProvider>,
    cache: Arc<dyn CacheHook>,
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Params::new(),
            content_mode: None,
            auth: Arc::new(NoAuth),
            cache: Arc::new(NoCache),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_headers(&self) -> &Params {
        &self.default_headers
    }

    pub fn content_mode(&self) -> Option<ContentMode> {
        self.content_mode
    }

    /// Derived client with `headers` merged over the current defaults.
    pub fn with_default_headers(&self, headers: Params) -> Self {
        let mut derived = self.clone();
        derived.default_headers.extend(headers);
        derived
    }

    pub fn with_default_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_default_headers(Params::from([(name.into(), value.into())]))
    }

    pub fn with_content_mode(&self, mode: ContentMode) -> Self {
        let mut derived = self.clone();
        derived.content_mode = Some(mode);
        derived
    }

    pub fn with_auth(&self, auth: Arc<dyn AuthProvider>) -> Self {
        let mut derived = self.clone();
        derived.auth = auth;
        derived
    }

    pub fn with_cache_hook(&self, cache: Arc<dyn CacheHook>) -> Self {
        let mut derived = self.clone();
        derived.cache = cache;
        derived
    }

    pub fn with_transport(&self, transport: Arc<dyn Transport>) -> Self {
        let mut derived = self.clone();
        derived.transport = transport;
        derived
    }

    /// Blocking view of this client that dispatches through `transport`.
    pub fn blocking(&self, transport: Arc<dyn BlockingTransport>) -> BlockingClient {
        BlockingClient::from_client(self.clone(), transport)
    }

    pub async fn get(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Get, path, query, headers, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Post, path, query, headers, body).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Put, path, query, headers, body).await
    }

    pub async fn patch(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Patch, path, query, headers, body).await
    }

    pub async fn delete(
        &self,
        path: &str,
        query: &Params,
        headers: &Params,
    ) -> Result<Option<Bytes>, ApiError> {
        self.request(HttpMethod::Delete, path, query, headers, None).await
    }

    /// Build and send in one step.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<Option<Bytes>, ApiError> {
        let request = self.build_request(method, path, query, headers, body)?;
        self.send(&request).await
    }

    /// Resolve a logical request against this client's configuration.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Params,
        headers: &Params,
        body: Option<Bytes>,
    ) -> Result<HttpRequest, ApiError> {
        let mut builder = RequestBuilder::new(self.base_url.as_str(), method, path)
            .query(query.clone())
            .default_headers(self.default_headers.clone())
            .headers(headers.clone())
            .content_mode(self.content_mode)
            .auth(Arc::clone(&self.auth));
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build()
    }

    /// Cache steps that run before the transport. A returned body answers
    /// the request and no other hook may fire.
    pub fn begin(&self, request: &HttpRequest) -> Option<Bytes> {
        self.cache.before_send(request);
        let cached = self.cache.lookup(request);
        if let Some(body) = &cached {
            debug!(len = body.len(), "cache lookup hit, skipping transport");
        }
        cached
    }

    /// Classify a transport response and fire the matching cache hook.
    pub fn parse_response(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> Result<Option<Bytes>, ApiError> {
        let status = response.status;
        let body = response.body;
        match StatusClass::from(status) {
            StatusClass::Success => {
                self.cache.on_success(&body);
                Ok(Some(body))
            }
            StatusClass::ClientError => {
                self.cache.on_failure(request, &body);
                Err(ApiError::ClientError { status, body })
            }
            StatusClass::ServerError => {
                self.cache.on_failure(request, &body);
                Err(ApiError::ServerError { status, body })
            }
            class => {
                self.cache.on_failure(request, &body);
                debug!(
                    status,
                    ?class,
                    body = %String::from_utf8_lossy(&body),
                    "unhandled status, resolving without a body"
                );
                Ok(None)
            }
        }
    }

    /// Dispatch a built request through the cache hook and the transport.
    #[instrument(
        name = "api_request",
        skip(self, request),
        fields(
            http.method = %request.method(),
            http.url = %request.url(),
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn send(&self, request: &HttpRequest) -> Result<Option<Bytes>, ApiError> {
        if let Some(cached) = self.begin(request) {
            return Ok(Some(cached));
        }
        let response = self.transport.send(request).await?;
        Span::current().record("http.status_code", response.status);
        self.parse_response(request, response)
    }

    /// `send` that resolves to `ApiError::Cancelled` once aborted through the
    /// `AbortHandle` paired with `registration`.
    pub async fn send_abortable(
        &self,
        request: &HttpRequest,
        registration: AbortRegistration,
    ) -> Result<Option<Bytes>, ApiError> {
        Abortable::new(self.send(request), registration)
            .await
            .unwrap_or(Err(ApiError::Cancelled))
    }

    /// Single-item stream delivering the outcome of `send`.
    pub fn send_stream(
        &self,
        request: HttpRequest,
    ) -> impl Stream<Item = Result<Option<Bytes>, ApiError>> + '_ {
        stream::once(async move { self.send(&request).await })
    }
}
