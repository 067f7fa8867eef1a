use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::Transport;
use crate::credential::Credential;
use crate::error::ProviderError;

/// Direct-call adapter against the Gemini REST endpoint. A server-proxied
/// deployment swaps in its own `Transport` implementation; the core above
/// this seam is identical in both modes.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .expect("failed to build reqwest client");
        Self { http }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the provider's human-readable message out of an error body, falling
/// back to the raw text when it is not the documented JSON envelope.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn generate_content(
        &self,
        credential: &Credential,
        model: &str,
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}/models/{}:generateContent", credential.base_url, model);
        tracing::debug!(model, "calling generateContent");

        let response = self
            .http
            .post(&url)
            .query(&[("key", credential.key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::new(err.status().map(|s| s.as_u16()), err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            tracing::error!(model, status = status.as_u16(), %message, "generateContent failed");
            return Err(ProviderError::new(Some(status.as_u16()), message));
        }

        response
            .json()
            .await
            .map_err(|err| ProviderError::new(None, format!("decoding response body: {err}")))
    }
}
