//! Deterministic assembly of wire requests.
//!
//! # Design
//! `RequestBuilder` holds the logical request (base URL, method, path, query,
//! header layers, body, content mode, auth) and `build` resolves it into an
//! immutable `HttpRequest`. Nothing here touches the network, so every merge
//! rule is testable without a transport.
//!
//! Merge order, later wins:
//! - query: caller parameters, then auth parameters
//! - headers: content mode, client defaults, per-call headers, auth headers

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::auth::{AuthProvider, NoAuth};
use crate::error::ApiError;
use crate::http::{ContentMode, HttpMethod, HttpRequest, Params};

/// Builder for a single `HttpRequest`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    method: HttpMethod,
    path: String,
    query: Params,
    default_headers: Params,
    headers: Params,
    body: Option<Bytes>,
    content_mode: Option<ContentMode>,
    auth: Arc<dyn AuthProvider>,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            method,
            path: path.into(),
            query: Params::new(),
            default_headers: Params::new(),
            headers: Params::new(),
            body: None,
            content_mode: None,
            auth: Arc::new(NoAuth),
        }
    }

    /// Caller query parameters. Replaces any previously set.
    pub fn query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Client-level headers, applied above the content mode headers.
    pub fn default_headers(mut self, headers: Params) -> Self {
        self.default_headers = headers;
        self
    }

    /// Per-call headers. Replaces any previously set.
    pub fn headers(mut self, headers: Params) -> Self {
        self.headers = headers;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_mode(mut self, mode: Option<ContentMode>) -> Self {
        self.content_mode = mode;
        self
    }

    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = auth;
        self
    }

    /// Resolve the final URL, headers and body.
    pub fn build(self) -> Result<HttpRequest, ApiError> {
        let url = self.url()?;
        let headers = self.merged_headers();
        validate_headers(&headers)?;

        let body = match self.body {
            Some(body) if !self.method.allows_body() => {
                debug!(method = %self.method, len = body.len(), "dropping body on bodiless method");
                None
            }
            body => body,
        };

        debug!(method = %self.method, url = %url, "built request");
        Ok(HttpRequest::new(self.method, url, headers, body))
    }

    fn url(&self) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ApiError::InvalidRequest(format!("URL invalid for '{}': {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
            return Err(ApiError::InvalidRequest(format!(
                "URL '{}' has no host",
                self.base_url
            )));
        }
        check_percent_encoding(&self.path)?;

        url.set_path(&self.path);
        url.set_fragment(None);
        url.set_query(None);

        let mut query = self.query.clone();
        query.extend(self.auth.query());
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        // The serialized form must parse back to the same URL.
        let reparsed = Url::parse(url.as_str()).map_err(|e| {
            ApiError::InvalidRequest(format!(
                "URL invalid for '{}' with method '{}' and path '{}': {e}",
                self.base_url, self.method, self.path
            ))
        })?;
        Ok(reparsed)
    }

    fn merged_headers(&self) -> Params {
        let content = self.content_mode.map(|mode| mode.headers()).unwrap_or_default();
        let auth = self.auth.headers();

        let mut merged = Params::new();
        for layer in [&content, &self.default_headers, &self.headers, &auth] {
            for (name, value) in layer {
                merged.insert(name.to_ascii_lowercase(), value.clone());
            }
        }
        merged
    }
}

/// Every name must be an HTTP token and every value visible ASCII or tab.
fn validate_headers(headers: &Params) -> Result<(), ApiError> {
    for (name, value) in headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ApiError::InvalidRequest(format!("invalid header name '{name}': {e}"))
        })?;
        HeaderValue::from_str(value).map_err(|e| {
            ApiError::InvalidRequest(format!("invalid value for header '{name}': {e}"))
        })?;
    }
    Ok(())
}

/// Reject `%` not followed by two hex digits.
fn check_percent_encoding(path: &str) -> Result<(), ApiError> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(ApiError::InvalidRequest(format!(
                    "malformed percent-encoding in path '{path}'"
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{HeaderAuth, QueryAuth};

    const BASE_URL: &str = "http://localhost:3000";

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[derive(Debug)]
    struct FixedAuth {
        headers: Params,
        query: Params,
    }

    impl AuthProvider for FixedAuth {
        fn headers(&self) -> Params {
            self.headers.clone()
        }

        fn query(&self) -> Params {
            self.query.clone()
        }
    }

    #[test]
    fn builds_url_from_base_and_path() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/api/fishes")
            .build()
            .unwrap();
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.url().as_str(), "http://localhost:3000/api/fishes");
        assert!(req.body().is_none());
        assert!(req.headers().is_empty());
    }

    #[test]
    fn path_replaces_base_url_path_and_query() {
        let base = "https://rickandmortyapi.com/v1/?old=1";
        let req = RequestBuilder::new(base, HttpMethod::Get, "/api/character/1")
            .build()
            .unwrap();
        assert_eq!(req.url().as_str(), "https://rickandmortyapi.com/api/character/1");
    }

    #[test]
    fn unparsable_base_url_is_invalid_request() {
        let err = RequestBuilder::new("not a url", HttpMethod::Get, "/")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn base_url_without_host_is_invalid_request() {
        for base in ["mailto:someone@example.com", "file:///tmp/data"] {
            let err = RequestBuilder::new(base, HttpMethod::Get, "/")
                .build()
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)), "{base}");
        }
    }

    #[test]
    fn malformed_percent_encoding_is_invalid_request() {
        for path in ["/api/%zz", "/api/%4", "/api/100%"] {
            let err = RequestBuilder::new(BASE_URL, HttpMethod::Get, path)
                .build()
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)), "{path}");
        }
    }

    #[test]
    fn well_formed_percent_encoding_is_kept() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/api/fish%20tank")
            .build()
            .unwrap();
        assert_eq!(req.url().path(), "/api/fish%20tank");
    }

    #[test]
    fn query_parameters_are_encoded() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/api/character")
            .query(params(&[("name", "rick sanchez"), ("status", "alive")]))
            .build()
            .unwrap();
        assert_eq!(req.query_param("name").as_deref(), Some("rick sanchez"));
        assert_eq!(req.query_param("status").as_deref(), Some("alive"));
        assert!(req.url().as_str().contains("name=rick+sanchez"));
    }

    #[test]
    fn auth_query_wins_over_caller_query() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .query(params(&[("q", "1"), ("page", "3")]))
            .auth(Arc::new(QueryAuth::new("q", "2")))
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("page".to_string(), "3".to_string()), ("q".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn empty_query_leaves_no_question_mark() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/api").build().unwrap();
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn header_precedence_content_defaults_call_auth() {
        let auth = FixedAuth {
            headers: params(&[("C", "5")]),
            query: Params::new(),
        };
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .content_mode(Some(ContentMode::Json))
            .default_headers(params(&[("Accept", "1"), ("B", "2")]))
            .headers(params(&[("B", "3"), ("C", "4")]))
            .auth(Arc::new(auth))
            .build()
            .unwrap();
        assert_eq!(req.header("Accept"), Some("1"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("B"), Some("3"));
        assert_eq!(req.header("C"), Some("5"));
    }

    #[test]
    fn header_names_collide_case_insensitively() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .default_headers(params(&[("X-Trace", "default")]))
            .header("x-trace", "call")
            .build()
            .unwrap();
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("X-TRACE"), Some("call"));
    }

    #[test]
    fn header_auth_overrides_call_authorization() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .header("authorization", "Basic old")
            .auth(Arc::new(HeaderAuth::bearer("abc")))
            .build()
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn malformed_header_names_are_invalid_requests() {
        for name in ["X-Bad Name", "X-Bad:Name", ""] {
            let err = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
                .header(name, "v")
                .build()
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidRequest(_)), "{name:?}");
        }
    }

    #[test]
    fn control_characters_in_header_values_are_invalid_requests() {
        let err = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .default_headers(params(&[("X-Trace", "a\r\nInjected: 1")]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(msg) if msg.contains("x-trace")));
    }

    #[test]
    fn malformed_auth_token_is_an_invalid_request() {
        let err = RequestBuilder::new(BASE_URL, HttpMethod::Get, "/")
            .auth(Arc::new(HeaderAuth::bearer("tok\nen")))
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn body_is_attached_verbatim() {
        let req = RequestBuilder::new(BASE_URL, HttpMethod::Post, "/api/posts")
            .body(&b"{\"title\":\"x\"}"[..])
            .build()
            .unwrap();
        assert_eq!(req.body().map(|b| b.as_ref()), Some(&b"{\"title\":\"x\"}"[..]));
    }

    #[test]
    fn get_and_delete_never_carry_a_body() {
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            let req = RequestBuilder::new(BASE_URL, method, "/api/posts/1")
                .body(&b"ignored"[..])
                .build()
                .unwrap();
            assert!(req.body().is_none(), "{method}");
        }
    }

    #[test]
    fn percent_check_accepts_plain_paths() {
        assert!(check_percent_encoding("/api/fishes").is_ok());
        assert!(check_percent_encoding("/a%2Fb%41").is_ok());
        assert!(check_percent_encoding("%").is_err());
    }
}
