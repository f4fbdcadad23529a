//! SDK configuration
//!
//! `SdkOptions` is the caller-facing input (and the `[sdk]` table of the CLI
//! config file). `Config::new` validates it once and freezes it: the base URL
//! is normalized, defaults are applied and every header is checked, so nothing
//! about the configuration can fail or change at request time.

use std::str::FromStr;
use std::time::Duration;

use common::Secret;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use transport::{AUTHORIZATION, HeaderName, HeaderValue};
use url::Url;

use crate::constants::DEFAULT_TIMEOUT_MS;
use crate::error::{Error, Result};

/// Header that carries the tenant credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialHeader {
    /// `Authorization: Bearer <credential>`
    #[default]
    #[serde(rename = "authorization")]
    Authorization,
    /// `apikey: <credential>`
    #[serde(rename = "apikey")]
    ApiKey,
}

impl CredentialHeader {
    /// Build the header pair delivering `credential` under this strategy.
    pub fn header_for(self, credential: &str) -> Result<(HeaderName, HeaderValue)> {
        let (name, raw) = match self {
            CredentialHeader::Authorization => (AUTHORIZATION, format!("Bearer {credential}")),
            CredentialHeader::ApiKey => (HeaderName::from_static("apikey"), credential.to_owned()),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| {
            Error::InvalidInput("tenant credential is not a valid header value".into())
        })?;
        value.set_sensitive(true);
        Ok((name, value))
    }
}

/// Unvalidated construction options.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdkOptions {
    /// Tenant anon key (preferred).
    pub tenant_anon_key: Option<Secret<String>>,
    /// Legacy alias for `tenant_anon_key`.
    pub api_key: Option<Secret<String>>,
    pub base_url: Option<String>,
    /// Milliseconds before a request without a caller token is abandoned.
    pub timeout_ms: Option<u64>,
    /// Extra headers sent with every request, in order.
    pub headers: IndexMap<String, String>,
    pub credential_header: CredentialHeader,
    /// Verify every issued token pair before returning it. Defaults to on.
    pub verify_issued_tokens: Option<bool>,
}

impl SdkOptions {
    pub fn new(base_url: impl Into<String>, tenant_anon_key: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            tenant_anon_key: Some(Secret::new(tenant_anon_key.into())),
            ..Self::default()
        }
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn credential_header(mut self, strategy: CredentialHeader) -> Self {
        self.credential_header = strategy;
        self
    }

    pub fn verify_issued_tokens(mut self, enabled: bool) -> Self {
        self.verify_issued_tokens = Some(enabled);
        self
    }
}

/// Validated, immutable SDK configuration.
#[derive(Debug, Clone)]
pub struct Config {
    credential: Secret<String>,
    base_url: String,
    timeout: Duration,
    headers: IndexMap<String, String>,
    parsed_headers: Vec<(HeaderName, HeaderValue)>,
    credential_header: CredentialHeader,
    credential_pair: (HeaderName, HeaderValue),
    verify_issued_tokens: bool,
}

impl Config {
    pub fn new(options: SdkOptions) -> Result<Self> {
        let raw_url = options
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::Configuration("'base_url' is required.".into()))?;
        let base_url = normalize_base_url(raw_url)?;

        let credential = options
            .tenant_anon_key
            .or(options.api_key)
            .filter(|key| !key.is_blank())
            .ok_or_else(|| {
                Error::Configuration("'tenant_anon_key' (or 'api_key') is required.".into())
            })?;

        let timeout_ms = options.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(Error::Configuration(
                "'timeout_ms' must be greater than 0.".into(),
            ));
        }

        let credential_pair = options
            .credential_header
            .header_for(credential.expose())
            .map_err(|_| {
                Error::Configuration("tenant credential is not a valid header value.".into())
            })?;

        let parsed_headers = options
            .headers
            .iter()
            .map(|(name, value)| parse_header(name, value))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            credential,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            headers: options.headers,
            parsed_headers,
            credential_header: options.credential_header,
            credential_pair,
            verify_issued_tokens: options.verify_issued_tokens.unwrap_or(true),
        })
    }

    /// Normalized base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Secret<String> {
        &self.credential
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Extra headers exactly as configured.
    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn credential_header(&self) -> CredentialHeader {
        self.credential_header
    }

    pub fn verify_issued_tokens(&self) -> bool {
        self.verify_issued_tokens
    }

    pub(crate) fn credential_pair(&self) -> &(HeaderName, HeaderValue) {
        &self.credential_pair
    }

    pub(crate) fn parsed_headers(&self) -> &[(HeaderName, HeaderValue)] {
        &self.parsed_headers
    }
}

/// Parse as an absolute URL, re-serialize, strip one trailing slash.
fn normalize_base_url(raw: &str) -> Result<String> {
    let invalid = || Error::Configuration(format!("baseUrl '{raw}' is not a valid URL."));
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }
    let serialized = url.as_str();
    Ok(serialized
        .strip_suffix('/')
        .unwrap_or(serialized)
        .to_owned())
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_str(name)
        .map_err(|e| Error::Configuration(format!("invalid header name '{name}': {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| Error::Configuration(format!("invalid value for header '{name}': {e}")))?;
    Ok((header_name, header_value))
}
