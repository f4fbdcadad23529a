//! HTTP client for the identity API
//!
//! Turns a path plus `RequestOptions` into exactly one authenticated,
//! time-bounded request through the injected `Transport`, and maps the outcome
//! onto the SDK error model:
//!
//! 1. Resolve the path against the base URL and append query parameters.
//! 2. Layer headers: credential, `Content-Type`, configured headers, per-call
//!    headers. Later layers replace earlier ones.
//! 3. Bound the call by the configured timeout, unless the caller passed a
//!    cancellation token, in which case the caller owns cancellation.
//! 4. Non-2xx → `Error::Api`; 204 → no payload; empty body → `{}`;
//!    anything else is parsed as JSON.
//!
//! The client keeps no mutable state, so one instance serves any number of
//! concurrent calls.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use common::Secret;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use transport::{
    CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, HttpRequest, HttpResponse, Method,
    StatusCode, Transport,
};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics;

/// Per-call request description. Defaults to a bare `GET`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    method: Method,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    credential: Option<Secret<String>>,
    cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Append a query parameter. Order of calls is preserved on the wire.
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// JSON request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: serde::Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(Error::Encode)?;
        Ok(self.body(value))
    }

    /// Header for this call only; wins over configured headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Deliver this tenant credential instead of the configured one.
    pub fn credential(mut self, credential: Option<Secret<String>>) -> Self {
        self.credential = credential;
        self
    }

    /// Hand cancellation to the caller. No client-side timeout is applied.
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Issues requests for the resource layer.
pub struct HttpClient {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn tenant_anon_key(&self) -> &Secret<String> {
        self.config.credential()
    }

    /// Issue a request and deserialize the payload as `T`.
    ///
    /// A 204 response deserializes from JSON `null`, so `T` must be `()` or
    /// an `Option` for endpoints that answer without content. An empty
    /// object (including an empty 2xx body) is accepted by those types too.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let payload = self
            .request_value(path, options)
            .await?
            .unwrap_or(Value::Null);
        let empty_object = matches!(&payload, Value::Object(map) if map.is_empty());

        match serde_json::from_value(payload) {
            Ok(value) => Ok(value),
            Err(e) if empty_object => {
                serde_json::from_value(Value::Null).map_err(|_| Error::Decode(e))
            }
            Err(e) => Err(Error::Decode(e)),
        }
    }

    /// Issue a request whose payload, if any, is irrelevant to the caller.
    pub async fn request_empty(&self, path: &str, options: RequestOptions) -> Result<()> {
        self.request_value(path, options).await.map(|_| ())
    }

    /// Issue a request and return the raw JSON payload.
    ///
    /// `None` means the server answered 204 No Content.
    #[instrument(skip_all, fields(method = %options.method, path = %path))]
    pub async fn request_value(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Option<Value>> {
        let url = self.build_url(path, &options.query)?;
        let headers = self.merge_headers(&options)?;
        let body = options
            .body
            .as_ref()
            .map(|body| serde_json::to_vec(body).map(Bytes::from))
            .transpose()
            .map_err(Error::Encode)?;

        let method = options.method.clone();
        let request = HttpRequest {
            method: options.method,
            url: url.into(),
            headers,
            body,
        };

        debug!(transport = self.transport.id(), "issuing request");
        let started = Instant::now();
        let outcome = match options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::Cancelled),
                    response = self.transport.issue(request) => response.map_err(Error::from),
                }
            }
            // The timer lives inside `timeout` and is dropped with it on every path.
            None => match tokio::time::timeout(self.config.timeout(), self.transport.issue(request))
                .await
            {
                Ok(response) => response.map_err(Error::from),
                Err(_) => Err(Error::Timeout),
            },
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "request failed before a response arrived");
                metrics::record_error(e.kind());
                return Err(e);
            }
        };

        let elapsed = started.elapsed();
        metrics::record_request(method.as_str(), response.status.as_u16(), elapsed.as_secs_f64());
        debug!(
            status = response.status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "response received"
        );

        decode_response(response)
    }

    /// Resolve `path` against the base URL and append `query` in order.
    pub(crate) fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = if path.starts_with('/') {
            format!("{}{path}", self.config.base_url())
        } else {
            format!("{}/{path}", self.config.base_url())
        };
        let mut url = Url::parse(&raw).map_err(|e| {
            Error::InvalidInput(format!("path '{path}' does not resolve to a URL: {e}"))
        })?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn merge_headers(&self, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let (name, value) = match &options.credential {
            Some(credential) => self
                .config
                .credential_header()
                .header_for(credential.expose())?,
            None => self.config.credential_pair().clone(),
        };
        headers.insert(name, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in self.config.parsed_headers() {
            headers.insert(name.clone(), value.clone());
        }

        for (name, value) in &options.headers {
            let header_name = match HeaderName::from_str(name) {
                Ok(n) => n,
                Err(e) => {
                    warn!(header = %name, error = %e, "skipping invalid header name");
                    continue;
                }
            };
            let header_value = match HeaderValue::from_str(value) {
                Ok(v) => v,
                Err(e) => {
                    warn!(header = %name, error = %e, "skipping invalid header value");
                    continue;
                }
            };
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

fn decode_response(response: HttpResponse) -> Result<Option<Value>> {
    if !response.status.is_success() {
        let err = Error::from_response(response.status, &response.body);
        warn!(status = response.status.as_u16(), code = err.code(), "request rejected by server");
        return Err(err);
    }
    if response.status == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    if response.body.is_empty() {
        return Ok(Some(Value::Object(Map::new())));
    }
    serde_json::from_slice(&response.body)
        .map(Some)
        .map_err(Error::Decode)
}
