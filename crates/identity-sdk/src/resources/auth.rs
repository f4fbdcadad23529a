//! Authentication resource
//!
//! One method per endpoint. The only logic beyond request mapping is the
//! post-issue check: when `verify_issued_tokens` is enabled, every call that
//! issues a token pair (sign-in, refresh, Google claim) immediately verifies
//! the access token and fails with `Error::TokenValidation` if the server
//! reports it invalid. A caller therefore never holds a token pair the server
//! would reject on the next verification.

use std::sync::Arc;

use common::Secret;
use tracing::{debug, warn};

use crate::client::{HttpClient, RequestOptions};
use crate::constants::{
    CONFIRM_REGISTRATION_PATH, FORGOT_PASSWORD_PATH, GOOGLE_AUTH_PATH, GOOGLE_CLAIM_PATH,
    LOGOUT_PATH, REFRESH_TOKEN_PATH, RESET_PASSWORD_PATH, SIGN_IN_PATH, SIGN_UP_PATH,
    TENANT_ANON_KEY_PARAM, VERIFY_PATH,
};
use crate::error::{Error, Result};
use crate::types::{
    ForgotPasswordBody, GoogleClaimBody, RefreshTokenBody, RegistrationAck, ResetPasswordBody,
    SignInRequest, SignUpRequest, TokenPair, VerifyResponse,
};

/// Sign-in, registration, token lifecycle and password recovery.
#[derive(Clone)]
pub struct AuthResource {
    client: Arc<HttpClient>,
}

impl AuthResource {
    pub(crate) fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Exchange email and password for a verified token pair.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<TokenPair> {
        let options = RequestOptions::post()
            .json(request)?
            .credential(request.tenant_anon_key.clone());
        let tokens = self.client.request(SIGN_IN_PATH, options).await?;
        self.ensure_verified(tokens, "sign-in", request.tenant_anon_key.as_ref())
            .await
    }

    /// Register an identity. The server answers with an acknowledgement only;
    /// tokens are obtained through `sign_in` once the registration is confirmed.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<RegistrationAck> {
        let options = RequestOptions::post()
            .json(request)?
            .credential(request.tenant_anon_key.clone());
        self.client.request(SIGN_UP_PATH, options).await
    }

    /// Trade a refresh token for a new, verified token pair.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        tenant_anon_key: Option<Secret<String>>,
    ) -> Result<TokenPair> {
        let options = RequestOptions::post()
            .json(&RefreshTokenBody { refresh_token })?
            .credential(tenant_anon_key.clone());
        let tokens = self.client.request(REFRESH_TOKEN_PATH, options).await?;
        self.ensure_verified(tokens, "refresh", tenant_anon_key.as_ref())
            .await
    }

    /// Revoke the session behind `refresh_token`.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let options = RequestOptions::post().json(&RefreshTokenBody { refresh_token })?;
        self.client.request_empty(LOGOUT_PATH, options).await
    }

    /// Ask the server whether `token` is currently valid.
    pub async fn verify_token(&self, token: &str) -> Result<VerifyResponse> {
        self.verify_with(token, None).await
    }

    /// Confirm a registration using the token from the confirmation email.
    pub async fn confirm_registration(&self, token: &str) -> Result<VerifyResponse> {
        let options = RequestOptions::get().query("token", token);
        self.client.request(CONFIRM_REGISTRATION_PATH, options).await
    }

    /// Browser-facing confirmation link for `token`.
    ///
    /// Links carry the tenant credential as a query parameter because a
    /// browser navigation cannot attach the credential header.
    pub fn confirm_registration_url(
        &self,
        token: &str,
        tenant_anon_key: Option<&Secret<String>>,
    ) -> Result<String> {
        let key = tenant_anon_key.unwrap_or_else(|| self.client.tenant_anon_key());
        let query = [
            ("token".to_owned(), token.to_owned()),
            (TENANT_ANON_KEY_PARAM.to_owned(), key.expose().clone()),
        ];
        let url = self.client.build_url(CONFIRM_REGISTRATION_PATH, &query)?;
        Ok(url.into())
    }

    /// URL that starts the Google OAuth flow for the tenant.
    pub fn google_auth_url(&self, tenant_anon_key: Option<&Secret<String>>) -> Result<String> {
        let key = tenant_anon_key.unwrap_or_else(|| self.client.tenant_anon_key());
        let query = [(TENANT_ANON_KEY_PARAM.to_owned(), key.expose().clone())];
        let url = self.client.build_url(GOOGLE_AUTH_PATH, &query)?;
        Ok(url.into())
    }

    /// Exchange the Google callback `code` (and `state`, when the flow used
    /// one) for a verified token pair.
    pub async fn claim_google(&self, code: &str, state: Option<&str>) -> Result<TokenPair> {
        let options = RequestOptions::post().json(&GoogleClaimBody { code, state })?;
        let tokens = self.client.request(GOOGLE_CLAIM_PATH, options).await?;
        self.ensure_verified(tokens, "google-claim", None).await
    }

    /// Start password recovery for `email`.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let options = RequestOptions::post().json(&ForgotPasswordBody { email })?;
        self.client.request_empty(FORGOT_PASSWORD_PATH, options).await
    }

    /// Set a new password using the token from the recovery email.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let options = RequestOptions::post().json(&ResetPasswordBody {
            token,
            new_password,
        })?;
        self.client.request_empty(RESET_PASSWORD_PATH, options).await
    }

    async fn verify_with(
        &self,
        token: &str,
        tenant_anon_key: Option<&Secret<String>>,
    ) -> Result<VerifyResponse> {
        let options = RequestOptions::get()
            .query("token", token)
            .credential(tenant_anon_key.cloned());
        self.client.request(VERIFY_PATH, options).await
    }

    /// Verify an issued access token with the same credential that obtained it.
    async fn ensure_verified(
        &self,
        tokens: TokenPair,
        operation: &'static str,
        tenant_anon_key: Option<&Secret<String>>,
    ) -> Result<TokenPair> {
        if !self.client.config().verify_issued_tokens() {
            return Ok(tokens);
        }

        let verdict = self.verify_with(&tokens.token, tenant_anon_key).await?;
        if verdict.is_valid {
            debug!(operation, "issued token verified");
            Ok(tokens)
        } else {
            warn!(operation, "server rejected the token it just issued");
            Err(Error::TokenValidation(format!(
                "token issued by {operation} failed server verification"
            )))
        }
    }
}
