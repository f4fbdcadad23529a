//! Identity API endpoints and client defaults
//!
//! All endpoints are versioned under `/api/v1` and resolved against the
//! configured base URL.

/// Request timeout applied when the caller supplies no cancellation token.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const SIGN_IN_PATH: &str = "/api/v1/auth/sign-in";
pub const SIGN_UP_PATH: &str = "/api/v1/identity/sign-up";
pub const REFRESH_TOKEN_PATH: &str = "/api/v1/auth/refresh-token";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const VERIFY_PATH: &str = "/api/v1/auth/verify";
pub const CONFIRM_REGISTRATION_PATH: &str = "/api/v1/identity/confirm-registration";
pub const GOOGLE_AUTH_PATH: &str = "/api/v1/auth/google";
pub const GOOGLE_CLAIM_PATH: &str = "/api/v1/auth/google/claim";
pub const FORGOT_PASSWORD_PATH: &str = "/api/v1/identity/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/api/v1/identity/reset-password";
pub const TENANTS_PATH: &str = "/api/v1/tenants";

/// Query parameter carrying the tenant credential in browser-facing URLs,
/// where no credential header can be attached.
pub const TENANT_ANON_KEY_PARAM: &str = "tenant_anon_key";
