//! Generic CRUD over a single REST resource.
//!
//! # Design
//! `Endpoint<T>` pairs a JSON-mode `Client` with a collection route such as
//! `/api/posts`. Member routes are `<route>/<id>`, where the id is
//! percent-encoded as one path segment so `/`, `%` or `..` inside an id can
//! never reach another resource. Empty, `.` and `..` ids are rejected with
//! `ApiError::InvalidRequest`. Models cross the wire through
//! `KeyConvention`, which rewrites JSON keys (snake_case on the wire by
//! default).
//!
//! Bodies that are absent or empty are not errors: `list` yields an empty
//! `Vec` and the single-record operations yield `None`. Any other body must
//! decode into the expected shape or the call fails with
//! `ApiError::Decoding`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::AuthProvider;
use crate::client::Client;
use crate::error::ApiError;
use crate::http::{ContentMode, Params};
use crate::naming::KeyConvention;

/// Everything but RFC 3986 unreserved characters is escaped in member ids.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A model with a unique identifier used to build member routes.
pub trait Identifiable {
    type Id: fmt::Display;

    fn id(&self) -> &Self::Id;
}

/// CRUD operations for `T` at a fixed route.
pub struct Endpoint<T> {
    client: Client,
    route: String,
    keys: KeyConvention,
    auth: Option<Arc<dyn AuthProvider>>,
    _model: PhantomData<fn() -> T>,
}

impl<T> Endpoint<T>
where
    T: Serialize + DeserializeOwned + Identifiable,
{
    /// Endpoint over a JSON-mode copy of `client`.
    pub fn new(client: &Client, route: impl Into<String>) -> Self {
        Self {
            client: client.with_content_mode(ContentMode::Json),
            route: route.into(),
            keys: KeyConvention::default(),
            auth: None,
            _model: PhantomData,
        }
    }

    pub fn with_key_convention(mut self, keys: KeyConvention) -> Self {
        self.keys = keys;
        self
    }

    /// Credentials applied to this endpoint's calls in addition to the
    /// client's own provider.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn key_convention(&self) -> KeyConvention {
        self.keys
    }

    /// GET the collection route.
    pub async fn list(&self, params: &Params) -> Result<Vec<T>, ApiError> {
        let (query, headers) = self.call_parts(params);
        let body = self.client.get(&self.route, &query, &headers).await?;
        match present(body) {
            Some(body) => self.decode(&body),
            None => Ok(Vec::new()),
        }
    }

    /// GET `<route>/<id>`.
    pub async fn show(&self, id: &T::Id, params: &Params) -> Result<Option<T>, ApiError> {
        let (query, headers) = self.call_parts(params);
        let body = self.client.get(&self.member_path(id)?, &query, &headers).await?;
        self.decode_optional(body)
    }

    /// POST the encoded model to the collection route.
    pub async fn create(&self, model: &T, params: &Params) -> Result<Option<T>, ApiError> {
        let payload = self.encode(model)?;
        let (query, headers) = self.call_parts(params);
        let body = self
            .client
            .post(&self.route, &query, &headers, Some(payload))
            .await?;
        self.decode_optional(body)
    }

    /// PATCH the encoded model to its member route.
    pub async fn update(&self, model: &T, params: &Params) -> Result<Option<T>, ApiError> {
        let payload = self.encode(model)?;
        let path = self.member_path(model.id())?;
        let (query, headers) = self.call_parts(params);
        let body = self
            .client
            .patch(&path, &query, &headers, Some(payload))
            .await?;
        self.decode_optional(body)
    }

    /// DELETE the model's member route. Servers may answer with the deleted
    /// representation.
    pub async fn destroy(&self, model: &T, params: &Params) -> Result<Option<T>, ApiError> {
        let path = self.member_path(model.id())?;
        let (query, headers) = self.call_parts(params);
        let body = self
            .client
            .delete(&path, &query, &headers)
            .await?;
        self.decode_optional(body)
    }

    /// `<route>/<id>` with the id escaped as a single path segment.
    fn member_path(&self, id: &T::Id) -> Result<String, ApiError> {
        let id = id.to_string();
        if id.is_empty() || id == "." || id == ".." {
            return Err(ApiError::InvalidRequest(format!(
                "id '{id}' cannot address a member of '{}'",
                self.route
            )));
        }
        Ok(format!(
            "{}/{}",
            self.route.trim_end_matches('/'),
            utf8_percent_encode(&id, PATH_SEGMENT)
        ))
    }

    /// Call params first, then endpoint credentials. Endpoint auth headers
    /// travel as per-call headers.
    fn call_parts(&self, params: &Params) -> (Params, Params) {
        let mut query = params.clone();
        let mut headers = Params::new();
        if let Some(auth) = &self.auth {
            query.extend(auth.query());
            headers.extend(auth.headers());
        }
        (query, headers)
    }

    fn encode(&self, model: &T) -> Result<Bytes, ApiError> {
        self.keys.encode(model).map(Bytes::from).inspect_err(|e| {
            debug!(route = %self.route, error = %e, "unable to encode request");
        })
    }

    fn decode<D: DeserializeOwned>(&self, body: &Bytes) -> Result<D, ApiError> {
        self.keys.decode(body).inspect_err(|e| {
            debug!(
                route = %self.route,
                error = %e,
                body = %String::from_utf8_lossy(body),
                "unable to decode response"
            );
        })
    }

    fn decode_optional(&self, body: Option<Bytes>) -> Result<Option<T>, ApiError> {
        present(body).map(|body| self.decode(&body)).transpose()
    }
}

fn present(body: Option<Bytes>) -> Option<Bytes> {
    body.filter(|b| !b.is_empty())
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("route", &self.route)
            .field("keys", &self.keys)
            .field("auth", &self.auth)
            .field("client", &self.client)
            .finish()
    }
}
