//! Authenticated JSON REST client with generic CRUD endpoints.
//!
//! # Overview
//! A `Client` turns a logical request (method, path, query, headers, body)
//! into an `HttpRequest`, hands it to a transport and classifies the status
//! of the answer. An `Endpoint<T>` layers list/show/create/update/destroy for
//! a serde model on top of a client.
//!
//! # Design
//! - Request building and response classification are pure and never touch
//!   the network; transports (`reqwest` async, `ureq` blocking) do the I/O.
//! - Credentials (`AuthProvider`) and caching (`CacheHook`) are trait objects
//!   with no-op defaults, shared through `Arc`.
//! - Client configuration is copy-on-write: `with_*` methods derive a new
//!   client and never mutate the original.
//! - 2xx returns the body, 4xx/5xx fail with `ApiError`, every other status
//!   resolves to `Ok(None)` after the cache hook's failure callback.

pub mod auth;
pub mod blocking;
pub mod cache;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod naming;
pub mod request;
pub mod status;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::{AuthProvider, HeaderAuth, NoAuth, QueryAuth};
pub use blocking::BlockingClient;
pub use cache::{CacheHook, NoCache};
pub use client::Client;
pub use config::ClientConfig;
pub use endpoint::{Endpoint, Identifiable};
pub use error::{ApiError, TransportError};
pub use http::{ContentMode, HttpMethod, HttpRequest, HttpResponse, Params};
pub use naming::KeyConvention;
pub use request::RequestBuilder;
pub use status::StatusClass;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::{BlockingTransport, Transport};
