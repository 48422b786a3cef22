//! Error types for request building, dispatch and model (de)serialization.
//!
//! # Design
//! `ClientError` and `ServerError` carry the status code and the raw body so
//! callers can inspect server-side validation messages. Transport failures
//! are reported by transports as `TransportError` and folded into `ApiError`
//! at the dispatch boundary.

use bytes::Bytes;
use thiserror::Error;

/// Errors returned by `Client` and `Endpoint` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL, path or final URL is malformed. Raised before any
    /// network activity.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport received a response without a usable status line.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The server answered 4xx.
    #[error("client error with status code {status}")]
    ClientError { status: u16, body: Bytes },

    /// The server answered 5xx.
    #[error("server error with status code {status}")]
    ServerError { status: u16, body: Bytes },

    /// The request model could not be serialized.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The response body did not match the expected model shape.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// A `ClientConfig` could not be loaded or names an unusable base URL.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The in-flight transport call was cancelled.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Status code for classified HTTP failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ClientError { status, .. } | ApiError::ServerError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Response body for classified HTTP failures.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            ApiError::ClientError { body, .. } | ApiError::ServerError { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Failures reported by a transport before any status could be classified.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timeout")]
    Timeout,

    /// The peer sent something that is not a valid HTTP response.
    #[error("malformed response: {0}")]
    InvalidResponse(String),

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidResponse(msg) => ApiError::InvalidResponse(msg),
            TransportError::Cancelled => ApiError::Cancelled,
            other => ApiError::Network(other.to_string()),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_display_and_accessors() {
        let err = ApiError::ClientError {
            status: 422,
            body: Bytes::from_static(b"{\"title\":\"required\"}"),
        };
        assert_eq!(err.to_string(), "client error with status code 422");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.body().map(|b| b.as_ref()), Some(&b"{\"title\":\"required\"}"[..]));
    }

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(ApiError::Cancelled.status(), None);
        assert!(ApiError::Decoding("x".into()).body().is_none());
    }

    #[test]
    fn transport_errors_map_to_network_errors() {
        let err: ApiError = TransportError::Connection("connection refused".into()).into();
        assert!(
            matches!(err, ApiError::Network(msg) if msg == "connection error: connection refused")
        );

        let err: ApiError = TransportError::Timeout.into();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn malformed_responses_and_cancellation_keep_their_class() {
        let err: ApiError = TransportError::InvalidResponse("no status line".into()).into();
        assert!(matches!(err, ApiError::InvalidResponse(_)));

        let err: ApiError = TransportError::Cancelled.into();
        assert!(matches!(err, ApiError::Cancelled));
    }

    #[test]
    fn url_parse_errors_are_invalid_requests() {
        let err: ApiError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
