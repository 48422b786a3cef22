//! HTTP wire types shared by the builder, the dispatcher and the transports.
//!
//! # Design
//! These types describe requests and responses as plain data. The core builds
//! `HttpRequest` values and classifies `HttpResponse` values; transports are
//! the only code that touches the network. Header names in an `HttpRequest`
//! are stored lowercased so later writes replace earlier ones regardless of
//! the caller's casing.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use url::Url;

/// String-to-string mapping used for query parameters, header sets and auth
/// contributions.
pub type Params = BTreeMap<String, String>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE never carry a request body.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content negotiation mode. Contributes the lowest-precedence headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    #[default]
    Json,
}

impl ContentMode {
    pub fn headers(&self) -> Params {
        match self {
            ContentMode::Json => Params::from([
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]),
        }
    }
}

/// A fully resolved request, ready to hand to a transport.
///
/// Built by `RequestBuilder::build`. Immutable once built: the fields are
/// only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    url: Url,
    headers: Params,
    body: Option<Bytes>,
}

impl HttpRequest {
    pub(crate) fn new(method: HttpMethod, url: Url, headers: Params, body: Option<Bytes>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Headers keyed by lowercased name.
    pub fn headers(&self) -> &Params {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Value of the first query parameter named `name`.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Cache key built from the method, the full URL and every header.
    ///
    /// Cache hooks are free to ignore this and derive their own key.
    pub fn fingerprint(&self) -> String {
        let mut key = format!("{} {}", self.method, self.url);
        for (name, value) in &self.headers {
            key.push('\n');
            key.push_str(name);
            key.push(':');
            key.push_str(value);
        }
        key
    }
}

/// A response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Params,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Params::new(),
            body: body.into(),
        }
    }
}
