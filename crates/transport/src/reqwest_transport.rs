//! Reqwest-backed transport, the production network path
//!
//! Sends the request exactly as built by the SDK (method, URL, headers, body)
//! and buffers the whole response. Status codes are not interpreted here; the
//! SDK's HTTP client owns error classification and timeouts.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use crate::{HttpRequest, HttpResponse, Result, Transport, TransportError};

/// Transport that issues requests through a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, proxy settings, TLS roots).
    ///
    /// Client-level timeouts configured on `client` still apply and surface as
    /// `TransportError::Timeout`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn id(&self) -> &str {
        "reqwest"
    }

    fn issue(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method, &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(|e| {
                warn!(error = %e, status = status.as_u16(), "failed to read response body");
                TransportError::Body(e.to_string())
            })?;

            debug!(status = status.as_u16(), bytes = body.len(), "response received");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
