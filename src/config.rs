//! Relay configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keychain service the API key is looked up under.
pub const KEYRING_SERVICE: &str = "playerdb-relay";

/// Environment variable consulted when neither file nor keychain has a key.
pub const API_KEY_ENV: &str = "PLAYERDB_API_KEY";

/// Remote endpoint settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Endpoint every request is posted to. Without it nothing is dispatched.
    #[serde(default)]
    pub url: Option<String>,
    /// Shared API key sent with every request; may be loaded at runtime.
    #[serde(default)]
    pub key: String,
    /// Per-request deadline enforced by the HTTP client.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Settings for the `lookup` command.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LookupConfig {
    /// Host permission a player needs to run `lookup`.
    pub permission: String,
}

/// Relay configuration parsed from `config.toml`.
///
/// The default value is the fully disabled configuration used when no file
/// can be loaded: no endpoint and no lookup command.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Remote endpoint settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Lookup command settings; absent disables the command.
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill in the API key from the OS keychain or `PLAYERDB_API_KEY` when
    /// the file did not provide one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no source provides a key.
    pub async fn load_credentials(&mut self) -> Result<()> {
        if self.api.key.is_empty() {
            self.api.key = load_credential("api_key", API_KEY_ENV).await?;
        }
        Ok(())
    }

    /// Endpoint URL, if one is configured.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.api.url.as_deref()
    }

    /// Per-request deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// Permission guarding `lookup`, or `None` when the command is disabled.
    #[must_use]
    pub fn lookup_permission(&self) -> Option<&str> {
        self.lookup.as_ref().map(|lookup| lookup.permission.as_str())
    }

    /// Turn the lookup command off, e.g. after a credential failure.
    pub fn disable_lookup(&mut self) {
        self.lookup = None;
    }

    fn validate(&mut self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            return Err(AppError::Config(
                "api.timeout_seconds must be greater than zero".into(),
            ));
        }

        if let Some(ref url) = self.api.url {
            let parsed = reqwest::Url::parse(url)
                .map_err(|err| AppError::Config(format!("api.url invalid: {err}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Config(format!(
                    "api.url must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        if self
            .lookup
            .as_ref()
            .is_some_and(|lookup| lookup.permission.trim().is_empty())
        {
            warn!("lookup.permission is empty; lookup command disabled");
            self.lookup = None;
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in config, keychain, or {env_key} env var"
        ))),
    }
}
