use serde::{Deserialize, Serialize};

use crate::constants::{API_KEY_PREFIX, DEFAULT_BASE_URL};
use crate::error::AiError;

/// Request-scoped credential: the API key plus the endpoint base URL.
/// Never persisted by this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    pub base_url: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            key: key.into(),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Key-shape check, enforced when the provider request is assembled —
    /// not at resolution time, so precedence and validation stay separate.
    pub fn ensure_key_format(&self) -> Result<(), AiError> {
        if !self.key.starts_with(API_KEY_PREFIX) {
            return Err(AiError::CredentialInvalidFormat);
        }
        Ok(())
    }
}

/// Per-call credential override accepted by every operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOverride {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl CredentialOverride {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            base_url: None,
        }
    }
}

/// Pick the key to use: an explicit caller-supplied key always wins, even
/// when it would fail the prefix check downstream. Falls back to the stored
/// credential, else signals that no credential exists at all.
pub fn resolve(
    overrides: Option<&CredentialOverride>,
    stored: Option<&Credential>,
) -> Result<Credential, AiError> {
    let explicit = overrides
        .and_then(|o| o.api_key.as_deref())
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let base_url = overrides
        .and_then(|o| o.base_url.as_deref())
        .or(stored.map(|c| c.base_url.as_str()));

    match (explicit, stored) {
        (Some(key), _) => Ok(Credential::new(key, base_url)),
        (None, Some(stored)) => Ok(Credential::new(stored.key.clone(), base_url)),
        (None, None) => Err(AiError::CredentialMissing),
    }
}
