//! Credential providers.
//!
//! A provider contributes headers and/or query parameters to every request it
//! is attached to. Contributions are a pure function of the stored
//! credentials, so one provider can be shared across concurrent requests.

use std::fmt;

use crate::http::Params;

/// Capability interface for attaching credentials to a request.
pub trait AuthProvider: fmt::Debug + Send + Sync {
    fn headers(&self) -> Params {
        Params::new()
    }

    fn query(&self) -> Params {
        Params::new()
    }
}

/// Provider that contributes nothing. The `Client` default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {}

/// `Authorization: <scheme> <token>` header credentials.
#[derive(Clone)]
pub struct HeaderAuth {
    scheme: String,
    token: String,
}

impl HeaderAuth {
    pub const DEFAULT_SCHEME: &'static str = "Bearer";

    pub fn new(scheme: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            token: token.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_SCHEME, token)
    }
}

impl AuthProvider for HeaderAuth {
    fn headers(&self) -> Params {
        Params::from([(
            "Authorization".to_string(),
            format!("{} {}", self.scheme, self.token),
        )])
    }
}

/// Token passed as a query parameter, e.g. `?token=...` or `?api_key=...`.
#[derive(Clone)]
pub struct QueryAuth {
    param: String,
    token: String,
}

impl QueryAuth {
    pub const DEFAULT_PARAM: &'static str = "token";

    pub fn new(param: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            token: token.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_PARAM, token)
    }
}

impl AuthProvider for QueryAuth {
    fn query(&self) -> Params {
        Params::from([(self.param.clone(), self.token.clone())])
    }
}

// Tokens stay out of debug output and logs.
impl fmt::Debug for HeaderAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderAuth")
            .field("scheme", &self.scheme)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for QueryAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryAuth")
            .field("param", &self.param)
            .field("token", &"<redacted>")
            .finish()
    }
}
