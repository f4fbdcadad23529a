//! Subcommands and their mapping onto SDK calls

use anyhow::Result;
use clap::Subcommand;
use identity_sdk::{
    CreateTenantRequest, DbStrategyType, IdentitySdk, Secret, SignInRequest, SignUpRequest,
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and print the verified token pair
    SignIn {
        email: String,
        #[arg(long, env = "IDENTITY_PASSWORD", hide_env_values = true)]
        password: String,
        /// Use this tenant credential instead of the configured one
        #[arg(long)]
        tenant_anon_key: Option<String>,
    },
    /// Register a new identity
    SignUp {
        email: String,
        #[arg(long, env = "IDENTITY_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tenant_anon_key: Option<String>,
    },
    /// Exchange a refresh token for a new token pair
    Refresh {
        refresh_token: String,
        #[arg(long)]
        tenant_anon_key: Option<String>,
    },
    Logout {
        refresh_token: String,
    },
    /// Check whether an access token is valid
    Verify {
        token: String,
    },
    ConfirmRegistration {
        token: String,
    },
    /// Print the browser link that confirms a registration
    ConfirmUrl {
        token: String,
        #[arg(long)]
        tenant_anon_key: Option<String>,
    },
    /// Print the URL that starts the Google sign-in flow
    GoogleUrl {
        #[arg(long)]
        tenant_anon_key: Option<String>,
    },
    /// Exchange a Google callback code for a token pair
    ClaimGoogle {
        code: String,
        #[arg(long)]
        state: Option<String>,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        #[arg(long, env = "IDENTITY_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Provision a tenant and print its anon key
    TenantCreate {
        name: String,
        #[arg(long, default_value_t = DbStrategyType::Shared)]
        db_strategy: DbStrategyType,
    },
    TenantGet {
        id: String,
    },
}

impl Command {
    /// Name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SignIn { .. } => "sign-in",
            Command::SignUp { .. } => "sign-up",
            Command::Refresh { .. } => "refresh",
            Command::Logout { .. } => "logout",
            Command::Verify { .. } => "verify",
            Command::ConfirmRegistration { .. } => "confirm-registration",
            Command::ConfirmUrl { .. } => "confirm-url",
            Command::GoogleUrl { .. } => "google-url",
            Command::ClaimGoogle { .. } => "claim-google",
            Command::ForgotPassword { .. } => "forgot-password",
            Command::ResetPassword { .. } => "reset-password",
            Command::TenantCreate { .. } => "tenant-create",
            Command::TenantGet { .. } => "tenant-get",
        }
    }
}

/// Run `command` and return what should be printed on stdout.
pub async fn execute(sdk: &IdentitySdk, command: Command) -> Result<Value> {
    let auth = sdk.auth();
    let output = match command {
        Command::SignIn {
            email,
            password,
            tenant_anon_key,
        } => {
            let mut request = SignInRequest::new(email, password);
            if let Some(key) = tenant_anon_key {
                request = request.with_tenant_anon_key(key);
            }
            to_json(auth.sign_in(&request).await?)?
        }
        Command::SignUp {
            email,
            password,
            name,
            tenant_anon_key,
        } => {
            let mut request = SignUpRequest::new(email, password);
            if let Some(name) = name {
                request = request.with_name(name);
            }
            if let Some(key) = tenant_anon_key {
                request = request.with_tenant_anon_key(key);
            }
            to_json(auth.sign_up(&request).await?)?
        }
        Command::Refresh {
            refresh_token,
            tenant_anon_key,
        } => {
            let tokens = auth
                .refresh_token(&refresh_token, tenant_anon_key.map(Secret::new))
                .await?;
            to_json(tokens)?
        }
        Command::Logout { refresh_token } => {
            auth.logout(&refresh_token).await?;
            json!({ "ok": true })
        }
        Command::Verify { token } => to_json(auth.verify_token(&token).await?)?,
        Command::ConfirmRegistration { token } => {
            to_json(auth.confirm_registration(&token).await?)?
        }
        Command::ConfirmUrl {
            token,
            tenant_anon_key,
        } => {
            let key = tenant_anon_key.map(Secret::new);
            json!({ "url": auth.confirm_registration_url(&token, key.as_ref())? })
        }
        Command::GoogleUrl { tenant_anon_key } => {
            let key = tenant_anon_key.map(Secret::new);
            json!({ "url": auth.google_auth_url(key.as_ref())? })
        }
        Command::ClaimGoogle { code, state } => {
            to_json(auth.claim_google(&code, state.as_deref()).await?)?
        }
        Command::ForgotPassword { email } => {
            auth.forgot_password(&email).await?;
            json!({ "ok": true })
        }
        Command::ResetPassword {
            token,
            new_password,
        } => {
            auth.reset_password(&token, &new_password).await?;
            json!({ "ok": true })
        }
        Command::TenantCreate { name, db_strategy } => {
            let request = CreateTenantRequest {
                name,
                db_strategy_type: db_strategy,
            };
            to_json(sdk.tenants().create(&request).await?)?
        }
        Command::TenantGet { id } => to_json(sdk.tenants().get(&id).await?)?,
    };
    Ok(output)
}

/// Machine-readable description of a failed command.
pub fn error_report(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<identity_sdk::Error>() {
        Some(sdk_err) => json!({
            "code": sdk_err.code(),
            "status": sdk_err.status_code(),
            "message": sdk_err.to_string(),
            "details": sdk_err.details(),
            "network": sdk_err.is_network(),
        }),
        None => json!({ "message": format!("{err:#}") }),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use identity_sdk::SdkOptions;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn sdk_for(server: &MockServer) -> IdentitySdk {
        IdentitySdk::new(SdkOptions::new(server.uri(), "tenant-key-123")).unwrap()
    }

    #[tokio::test]
    async fn sign_in_prints_verified_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/sign-in"))
            .and(body_json(json!({"email": "a@b.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "t1", "refresh_token": "r1"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/verify"))
            .and(query_param("token", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"is_valid": true})))
            .expect(1)
            .mount(&server)
            .await;

        let output = execute(
            &sdk_for(&server).await,
            Command::SignIn {
                email: "a@b.com".into(),
                password: "pw".into(),
                tenant_anon_key: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(output, json!({"token": "t1", "refresh_token": "r1"}));
    }

    #[tokio::test]
    async fn tenant_create_sends_strategy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/tenants"))
            .and(header("authorization", "Bearer tenant-key-123"))
            .and(body_json(json!({"name": "acme", "db_strategy_type": "isolated"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "t-1",
                "name": "acme",
                "db_strategy_type": "isolated",
                "anon_key": "anon-acme"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = execute(
            &sdk_for(&server).await,
            Command::TenantCreate {
                name: "acme".into(),
                db_strategy: DbStrategyType::Isolated,
            },
        )
        .await
        .unwrap();
        assert_eq!(output["anon_key"], "anon-acme");
    }

    #[tokio::test]
    async fn logout_prints_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let output = execute(
            &sdk_for(&server).await,
            Command::Logout {
                refresh_token: "r1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, json!({"ok": true}));
    }

    #[tokio::test]
    async fn url_commands_make_no_requests() {
        let server = MockServer::start().await;
        let sdk = sdk_for(&server).await;

        let output = execute(
            &sdk,
            Command::GoogleUrl {
                tenant_anon_key: Some("other".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            output["url"],
            format!("{}/api/v1/auth/google?tenant_anon_key=other", server.uri())
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn api_errors_are_reported_with_code_and_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tenants/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "TENANT_NOT_FOUND",
                "message": "Tenant not found"
            })))
            .mount(&server)
            .await;

        let err = execute(
            &sdk_for(&server).await,
            Command::TenantGet {
                id: "missing".into(),
            },
        )
        .await
        .unwrap_err();

        let report = error_report(&err);
        assert_eq!(report["code"], "TENANT_NOT_FOUND");
        assert_eq!(report["status"], 404);
        assert_eq!(report["message"], "Tenant not found");
        assert_eq!(report["network"], false);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported_as_network_failure() {
        let sdk = IdentitySdk::new(SdkOptions::new("http://127.0.0.1:1", "k")).unwrap();
        let err = execute(
            &sdk,
            Command::Verify {
                token: "t1".into(),
            },
        )
        .await
        .unwrap_err();

        let report = error_report(&err);
        assert_eq!(report["code"], "NETWORK_ERROR");
        assert_eq!(report["network"], true);
        assert!(report["status"].is_null());
    }

    #[test]
    fn non_sdk_errors_report_message_only() {
        let report = error_report(&anyhow::anyhow!("config missing"));
        assert_eq!(report, json!({"message": "config missing"}));
    }
}
