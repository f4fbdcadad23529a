//! Wire types for the identity API
//!
//! Field names match the server's snake_case JSON. Tokens and tenant keys are
//! relayed as opaque strings; the SDK never parses or stores them.

use std::fmt;

use common::Secret;
use serde::{Deserialize, Serialize};

/// Access token plus refresh token, issued by sign-in, refresh and OAuth claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Acknowledgement returned by sign-up. Tokens are issued only after the
/// registration is confirmed and the user signs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationAck {
    pub message: String,
}

/// Result of a token or registration-token check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub is_valid: bool,
}

#[derive(Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    /// Credential for this call only; sent as the credential header.
    #[serde(skip)]
    pub tenant_anon_key: Option<Secret<String>>,
}

impl SignInRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            tenant_anon_key: None,
        }
    }

    pub fn with_tenant_anon_key(mut self, key: impl Into<String>) -> Self {
        self.tenant_anon_key = Some(Secret::new(key.into()));
        self
    }
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("tenant_anon_key", &self.tenant_anon_key)
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip)]
    pub tenant_anon_key: Option<Secret<String>>,
}

impl SignUpRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: None,
            tenant_anon_key: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tenant_anon_key(mut self, key: impl Into<String>) -> Self {
        self.tenant_anon_key = Some(Secret::new(key.into()));
        self
    }
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("tenant_anon_key", &self.tenant_anon_key)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Serialize)]
pub(crate) struct GoogleClaimBody<'a> {
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'a str>,
}

#[derive(Serialize)]
pub(crate) struct ForgotPasswordBody<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ResetPasswordBody<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

/// Storage layout of a tenant's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbStrategyType {
    /// Rows live in shared tables, partitioned by tenant.
    Shared,
    /// The tenant gets its own database.
    Isolated,
}

impl fmt::Display for DbStrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbStrategyType::Shared => write!(f, "shared"),
            DbStrategyType::Isolated => write!(f, "isolated"),
        }
    }
}

impl std::str::FromStr for DbStrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shared" => Ok(DbStrategyType::Shared),
            "isolated" => Ok(DbStrategyType::Isolated),
            other => Err(format!(
                "unknown db strategy '{other}', expected 'shared' or 'isolated'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub db_strategy_type: DbStrategyType,
}

/// A provisioned tenant. `anon_key` is the credential for SDK instances that
/// act on behalf of this tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub db_strategy_type: DbStrategyType,
    pub anon_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_in_body_excludes_credential_override() {
        let request = SignInRequest::new("a@b.com", "pw").with_tenant_anon_key("other");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "pw"}));
    }

    #[test]
    fn sign_up_body_omits_missing_name() {
        let body = serde_json::to_value(SignUpRequest::new("a@b.com", "pw")).unwrap();
        assert_eq!(body, json!({"email": "a@b.com", "password": "pw"}));

        let body = serde_json::to_value(SignUpRequest::new("a@b.com", "pw").with_name("Ada")).unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[test]
    fn debug_redacts_passwords() {
        let debug = format!("{:?}", SignInRequest::new("a@b.com", "hunter2"));
        assert!(!debug.contains("hunter2"));
        let debug = format!("{:?}", SignUpRequest::new("a@b.com", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn token_pair_uses_snake_case_refresh_token() {
        let tokens: TokenPair =
            serde_json::from_str(r#"{"token":"t1","refresh_token":"r1"}"#).unwrap();
        assert_eq!(tokens.token, "t1");
        assert_eq!(tokens.refresh_token, "r1");
    }

    #[test]
    fn tenant_deserializes_strategy() {
        let tenant: Tenant = serde_json::from_value(json!({
            "id": "t-1",
            "name": "acme",
            "db_strategy_type": "isolated",
            "anon_key": "anon-acme"
        }))
        .unwrap();
        assert_eq!(tenant.db_strategy_type, DbStrategyType::Isolated);
        assert!(serde_json::from_value::<DbStrategyType>(json!("hybrid")).is_err());
    }

    #[test]
    fn db_strategy_parses_from_cli_text() {
        assert_eq!("shared".parse::<DbStrategyType>(), Ok(DbStrategyType::Shared));
        assert_eq!(DbStrategyType::Isolated.to_string(), "isolated");
        assert!("Shared".parse::<DbStrategyType>().is_err());
    }
}
