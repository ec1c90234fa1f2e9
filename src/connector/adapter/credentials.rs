use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::ConfigurationError;

/// Environment variables checked for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// A provider API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank keys count as missing; embedded whitespace or control characters
    /// make a key invalid.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(ConfigurationError::MissingCredential);
        }
        if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ConfigurationError::InvalidCredential(
                "key contains whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(****)")
    }
}

/// Layout of a TOML secrets file, e.g.
///
/// ```toml
/// GOOGLE_API_KEY = "AIza..."
/// ```
#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,
}

/// Resolve the API key from the environment, then from `secrets_file`.
///
/// `env` is the variable lookup (normally [`std::env::var`]); taking it as a
/// parameter keeps resolution independent of the real process environment.
pub fn resolve_api_key<F>(env: F, secrets_file: Option<&Path>) -> Result<ApiKey, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    for var in API_KEY_ENV_VARS {
        if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
            debug!("Using API key from ${}", var);
            return ApiKey::parse(&value);
        }
    }

    let Some(path) = secrets_file else {
        return Err(ConfigurationError::MissingCredential);
    };

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigurationError::SecretsFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let secrets: SecretsFile =
        toml::from_str(&contents).map_err(|e| ConfigurationError::SecretsFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match secrets.google_api_key {
        Some(value) => {
            info!("Using API key from {}", path.display());
            ApiKey::parse(&value)
        }
        None => Err(ConfigurationError::MissingCredential),
    }
}
