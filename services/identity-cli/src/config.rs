//! Configuration file loading
//!
//! Precedence: CLI args > env vars > config file > defaults.
//! The tenant credential may live in the TOML, but IDENTITY_TENANT_ANON_KEY
//! or a `tenant_anon_key_file` keep it out of files that get shared.

use common::Secret;
use identity_sdk::SdkOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const TENANT_KEY_ENV: &str = "IDENTITY_TENANT_ANON_KEY";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "identity-cli.toml";

/// Root configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to a file containing the tenant credential
    #[serde(default)]
    pub tenant_anon_key_file: Option<PathBuf>,
    pub sdk: SdkOptions,
}

impl Config {
    /// Load configuration from a TOML file, then overlay the credential.
    ///
    /// Credential resolution order:
    /// 1. IDENTITY_TENANT_ANON_KEY env var
    /// 2. tenant_anon_key_file path from config
    /// 3. `sdk.tenant_anon_key` in the file itself
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(key) = std::env::var(TENANT_KEY_ENV) {
            config.sdk.tenant_anon_key = Some(Secret::new(key));
        } else if let Some(ref key_file) = config.tenant_anon_key_file {
            let key = std::fs::read_to_string(key_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read tenant_anon_key_file {}: {e}",
                    key_file.display()
                ))
            })?;
            let key = key.trim().to_owned();
            if key.is_empty() {
                return Err(common::Error::Config(format!(
                    "tenant_anon_key_file {} is empty",
                    key_file.display()
                )));
            }
            config.sdk.tenant_anon_key = Some(Secret::new(key));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_path {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(p);
        }
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }
}
