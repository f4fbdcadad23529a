//! Tenant provisioning

use std::sync::Arc;

use crate::client::{HttpClient, RequestOptions};
use crate::constants::TENANTS_PATH;
use crate::error::{Error, Result};
use crate::types::{CreateTenantRequest, Tenant};

#[derive(Clone)]
pub struct TenantsResource {
    client: Arc<HttpClient>,
}

impl TenantsResource {
    pub(crate) fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Provision a tenant. The returned `anon_key` is the credential for
    /// SDK instances acting on behalf of the new tenant.
    pub async fn create(&self, request: &CreateTenantRequest) -> Result<Tenant> {
        let options = RequestOptions::post().json(request)?;
        self.client.request(TENANTS_PATH, options).await
    }

    pub async fn get(&self, tenant_id: &str) -> Result<Tenant> {
        validate_tenant_id(tenant_id)?;
        let path = format!("{TENANTS_PATH}/{tenant_id}");
        self.client.request(&path, RequestOptions::get()).await
    }
}

/// Ids are interpolated into the path, so anything that would change which
/// resource the URL names is refused before a request is made.
fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    if tenant_id.trim().is_empty() {
        return Err(Error::InvalidInput("tenant id must not be empty".into()));
    }
    if let Some(c) = tenant_id
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#'))
    {
        return Err(Error::InvalidInput(format!(
            "tenant id '{tenant_id}' contains reserved character '{c}'"
        )));
    }

    // Servers may decode these before routing
    let lowered = tenant_id.to_ascii_lowercase();
    if lowered.contains("%2f") || lowered.contains("%5c") {
        return Err(Error::InvalidInput(format!(
            "tenant id '{tenant_id}' contains an encoded path separator"
        )));
    }
    if matches!(lowered.replace("%2e", ".").as_str(), "." | "..") {
        return Err(Error::InvalidInput(format!(
            "tenant id '{tenant_id}' is a dot segment"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SdkOptions};
    use crate::types::DbStrategyType;
    use serde_json::{Value, json};
    use transport::{Method, MockTransport};

    fn tenants(mock: MockTransport) -> (TenantsResource, Arc<MockTransport>) {
        let mock = Arc::new(mock);
        let config = Config::new(SdkOptions::new("https://auth.example.com", "admin-key")).unwrap();
        let client = HttpClient::new(config, mock.clone());
        (TenantsResource::new(Arc::new(client)), mock)
    }

    #[tokio::test]
    async fn create_posts_request_and_returns_tenant() {
        let echoed = json!({
            "id": "t-1",
            "name": "acme",
            "db_strategy_type": "isolated",
            "anon_key": "anon-acme"
        });
        let (tenants, mock) = tenants(MockTransport::new().respond_json(201, &echoed));

        let tenant = tenants
            .create(&CreateTenantRequest {
                name: "acme".into(),
                db_strategy_type: DbStrategyType::Isolated,
            })
            .await
            .unwrap();
        assert_eq!(tenant.id, "t-1");
        assert_eq!(tenant.anon_key, "anon-acme");
        assert_eq!(tenant.db_strategy_type, DbStrategyType::Isolated);
        assert_eq!(serde_json::to_value(&tenant).unwrap(), echoed);

        let sent = &mock.requests()[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "https://auth.example.com/api/v1/tenants");
        let body: Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "acme", "db_strategy_type": "isolated"}));
    }

    #[tokio::test]
    async fn get_fetches_by_id() {
        let (tenants, mock) = tenants(MockTransport::new().respond(
            200,
            r#"{"id":"t-1","name":"acme","db_strategy_type":"shared","anon_key":"anon-acme"}"#,
        ));

        let tenant = tenants.get("t-1").await.unwrap();
        assert_eq!(tenant.name, "acme");
        assert_eq!(tenant.db_strategy_type, DbStrategyType::Shared);

        let sent = &mock.requests()[0];
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url, "https://auth.example.com/api/v1/tenants/t-1");
    }

    #[tokio::test]
    async fn get_missing_tenant_is_api_error() {
        let (tenants, _) = tenants(
            MockTransport::new().respond(404, r#"{"code":"TENANT_NOT_FOUND","message":"Tenant not found"}"#),
        );
        let err = tenants.get("nope").await.unwrap_err();
        assert_eq!(err.code(), "TENANT_NOT_FOUND");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_string(), "Tenant not found");
    }

    #[tokio::test]
    async fn rejects_ids_that_alter_the_path() {
        let (tenants, mock) = tenants(MockTransport::new());

        for id in [
            "", "  ", "a/b", "../admin", "a\\b", "t-1?x=1", "t-1#frag", ".", "..", "%2e%2e",
            "%2E%2e", ".%2E", "%2e", "a%2fb", "a%2Fb", "a%5cb",
        ] {
            let err = tenants.get(id).await.unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "id {id:?}");
            assert_eq!(err.code(), "INVALID_INPUT");
        }
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn dots_inside_an_id_are_allowed() {
        let body = r#"{"id":"x","name":"acme","db_strategy_type":"shared","anon_key":"a"}"#;
        let (tenants, mock) = tenants(
            MockTransport::new()
                .respond(200, body)
                .respond(200, body)
                .respond(200, body),
        );

        for id in ["acme.eu", "...", "v1..2"] {
            tenants.get(id).await.unwrap();
        }
        let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            [
                "https://auth.example.com/api/v1/tenants/acme.eu",
                "https://auth.example.com/api/v1/tenants/...",
                "https://auth.example.com/api/v1/tenants/v1..2",
            ]
        );
    }
}
