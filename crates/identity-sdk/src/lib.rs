//! Client library for the multi-tenant identity API
//!
//! Wraps sign-in, registration, token refresh and verification, logout,
//! password recovery, Google OAuth claim and tenant provisioning behind a
//! typed, async interface. The crate has no dependency on the CLI binary and
//! can be tested and used independently.
//!
//! Request flow:
//! 1. `Config::new()` validates `SdkOptions` once; an invalid config never
//!    produces a client
//! 2. A resource method (`auth()`, `tenants()`) maps its arguments onto a
//!    path and `RequestOptions`
//! 3. `HttpClient` issues exactly one request through the `Transport`,
//!    bounded by the configured timeout or a caller `CancellationToken`
//! 4. Failures surface as `Error`, which always carries a stable code
//! 5. Token-issuing calls verify the access token before returning it
//!
//! ```no_run
//! use identity_sdk::{IdentitySdk, SdkOptions, SignInRequest};
//!
//! # async fn run() -> identity_sdk::Result<()> {
//! let sdk = IdentitySdk::new(SdkOptions::new("https://auth.example.com", "tenant-key"))?;
//! let tokens = sdk
//!     .auth()
//!     .sign_in(&SignInRequest::new("a@b.com", "pw"))
//!     .await?;
//! println!("{}", tokens.token);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
mod metrics;
pub mod resources;
pub mod types;

use std::sync::Arc;

use transport::{ReqwestTransport, Transport};

pub use client::{HttpClient, RequestOptions};
pub use common::Secret;
pub use config::{Config, CredentialHeader, SdkOptions};
pub use error::{Error, Result};
pub use resources::{AuthResource, TenantsResource};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    CreateTenantRequest, DbStrategyType, RegistrationAck, SignInRequest, SignUpRequest, Tenant,
    TokenPair, VerifyResponse,
};

/// Entry point. Cheap to clone; all clones share one HTTP client.
#[derive(Clone)]
pub struct IdentitySdk {
    client: Arc<HttpClient>,
    auth: AuthResource,
    tenants: TenantsResource,
}

impl IdentitySdk {
    /// Build an SDK that talks HTTP through reqwest.
    pub fn new(options: SdkOptions) -> Result<Self> {
        Self::with_transport(options, Arc::new(ReqwestTransport::new()))
    }

    /// Build an SDK over any transport.
    pub fn with_transport(options: SdkOptions, transport: Arc<dyn Transport>) -> Result<Self> {
        let config = Config::new(options)?;
        let client = Arc::new(HttpClient::new(config, transport));
        Ok(Self {
            auth: AuthResource::new(client.clone()),
            tenants: TenantsResource::new(client.clone()),
            client,
        })
    }

    pub fn auth(&self) -> &AuthResource {
        &self.auth
    }

    pub fn tenants(&self) -> &TenantsResource {
        &self.tenants
    }

    /// Low-level client, for endpoints without a resource method.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}
