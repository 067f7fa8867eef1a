use std::env;

use crate::credential::Credential;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";

/// Environment-sourced fallback credential, used when a call carries no
/// explicit key. Absence is fine: resolution then reports the missing
/// credential to the caller.
pub fn stored_credential() -> Option<Credential> {
    let key = env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty())?;
    let base_url = env::var(ENV_BASE_URL).ok();
    Some(Credential::new(key, base_url.as_deref()))
}
