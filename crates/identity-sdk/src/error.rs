//! SDK error model
//!
//! Every failure surfaces as one `Error`. Callers branch on `code()` (the
//! machine-readable code from the server, or one of the client-side codes
//! below) and `status_code()`, which is present only for errors derived from
//! an HTTP response. Nothing is retried.

use serde_json::{Map, Value};
use transport::{StatusCode, TransportError};

/// Server returned a non-success status without a `code` field.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
/// Transport failure, timeout or caller cancellation.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// An issued token was reported invalid by the verify endpoint.
pub const TOKEN_VALIDATION_FAILED: &str = "TOKEN_VALIDATION_FAILED";
pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const INVALID_INPUT: &str = "INVALID_INPUT";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The SDK could not be constructed. Raised only by `Config::new`.
    #[error("SDK Initialization Error: {0}")]
    Configuration(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        message: String,
        code: String,
        status: u16,
        details: Option<Value>,
    },

    #[error("Request timed out.")]
    Timeout,

    /// The caller's cancellation token fired before a response arrived.
    #[error("Request cancelled.")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error("{0}")]
    TokenValidation(String),

    /// A success response carried a body that is not valid JSON, or JSON of
    /// an unexpected shape.
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an `Api` error from a failed response.
    ///
    /// The body is parsed as JSON when possible. `message` falls back to the
    /// status reason phrase and then to "Unknown error"; `code` falls back to
    /// `UNKNOWN_ERROR`; `details` is passed through untouched.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let payload = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.into_owned()))
        };
        let fields = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let message = fields
            .get("message")
            .and_then(non_null_text)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_else(|| "Unknown error".to_owned());
        let code = fields
            .get("code")
            .and_then(non_null_text)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
        let details = fields.get("details").filter(|v| !v.is_null()).cloned();

        Error::Api {
            message,
            code,
            status: status.as_u16(),
            details,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        match self {
            Error::Configuration(_) => CONFIGURATION_ERROR,
            Error::Api { code, .. } => code.as_str(),
            Error::Timeout | Error::Cancelled | Error::Network(_) => NETWORK_ERROR,
            Error::TokenValidation(_) => TOKEN_VALIDATION_FAILED,
            Error::Decode(_) => INVALID_RESPONSE,
            Error::Encode(_) => INVALID_REQUEST,
            Error::InvalidInput(_) => INVALID_INPUT,
        }
    }

    /// HTTP status, present only when the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Opaque `details` from the server error body.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Error::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Whether the request never produced a response.
    pub fn is_network(&self) -> bool {
        self.code() == NETWORK_ERROR
    }

    /// Short label used for log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration",
            Error::Api { .. } => "api",
            Error::Timeout => "timeout",
            Error::Cancelled => "cancelled",
            Error::Network(_) => "network",
            Error::TokenValidation(_) => "token_validation",
            Error::Decode(_) => "decode",
            Error::Encode(_) => "encode",
            Error::InvalidInput(_) => "invalid_input",
        }
    }
}

fn non_null_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_body_supplies_code_message_and_details() {
        let body = br#"{"code":"INVALID_CREDENTIALS","message":"Wrong password","details":{"attempts":3}}"#;
        let err = Error::from_response(StatusCode::UNAUTHORIZED, body);

        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert_eq!(err.to_string(), "Wrong password");
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.details().unwrap()["attempts"], 3);
    }

    #[test]
    fn non_json_body_falls_back_to_status_text() {
        let err = Error::from_response(StatusCode::BAD_GATEWAY, b"<html>upstream down</html>");
        assert_eq!(err.code(), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.status_code(), Some(502));
        assert!(err.details().is_none());
    }

    #[test]
    fn empty_body_falls_back_to_status_text() {
        let err = Error::from_response(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.code(), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn unknown_status_without_reason_uses_generic_message() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = Error::from_response(status, b"{}");
        assert_eq!(err.to_string(), "Unknown error");
        assert_eq!(err.status_code(), Some(599));
    }

    #[test]
    fn codeless_json_body_keeps_message() {
        let err = Error::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"message":"email is required"}"#,
        );
        assert_eq!(err.code(), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn json_array_body_is_not_a_field_source() {
        let err = Error::from_response(StatusCode::CONFLICT, br#"["TENANT_EXISTS"]"#);
        assert_eq!(err.code(), UNKNOWN_ERROR);
        assert_eq!(err.to_string(), "Conflict");
    }

    #[test]
    fn client_side_codes() {
        assert_eq!(Error::Timeout.code(), NETWORK_ERROR);
        assert_eq!(Error::Cancelled.code(), NETWORK_ERROR);
        assert_eq!(
            Error::Network(TransportError::Connect("refused".into())).code(),
            NETWORK_ERROR
        );
        assert_eq!(
            Error::TokenValidation("bad".into()).code(),
            TOKEN_VALIDATION_FAILED
        );
        assert_eq!(
            Error::Configuration("x".into()).code(),
            CONFIGURATION_ERROR
        );
        assert!(Error::Timeout.status_code().is_none());
        assert!(Error::Timeout.is_network());
    }

    #[test]
    fn timeout_message_mentions_timed_out() {
        assert!(Error::Timeout.to_string().contains("timed out"));
    }
}
