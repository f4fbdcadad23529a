//! HTTP transport abstraction for the identity SDK
//!
//! Defines the `Transport` trait that decouples request construction and error
//! normalization from the network primitive. `ReqwestTransport` is the
//! production implementation; `MockTransport` (feature `mock`) replays scripted
//! responses so the SDK pipeline can be exercised without a server.
//!
//! Requests and responses are plain data. The transport never interprets
//! status codes or bodies and never applies timeouts of its own: a non-2xx
//! response is still `Ok`, and cancellation belongs to the caller.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod reqwest_transport;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use reqwest_transport::ReqwestTransport;

pub use bytes::Bytes;
pub use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
pub use reqwest::{Method, StatusCode};

use std::future::Future;
use std::pin::Pin;

/// An outbound HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Fully resolved URL including the query string.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// Response with the given status and body and no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Failures below the HTTP layer: the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Capability to issue one HTTP request and return its response.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn Transport>`), so the SDK can hold any implementation.
pub trait Transport: Send + Sync {
    /// Identifier for logging (e.g. "reqwest", "mock")
    fn id(&self) -> &str;

    /// Send `request` and buffer the full response.
    ///
    /// Must perform exactly one network exchange. Dropping the returned future
    /// abandons the request.
    fn issue(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}
