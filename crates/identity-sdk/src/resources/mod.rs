//! Resource namespaces for the identity API.

mod auth;
mod tenants;

pub use auth::AuthResource;
pub use tenants::TenantsResource;
