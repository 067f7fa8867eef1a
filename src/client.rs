use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config;
use crate::constants::{
    GEMINI_IMAGE_MODEL, GEMINI_PING_MODEL, MAX_SECTION_REFERENCE_IMAGES, SECTION_ASPECT_RATIO,
    THUMBNAIL_ASPECT_RATIO,
};
use crate::core::{
    ConnectionStatus, ConnectionTestResult, DetailImageSegment, GenerationState, ImageData,
    ProductDraft, ProductInfo, Transport,
};
use crate::credential::{self, Credential, CredentialOverride};
use crate::error::{self, AiError};
use crate::prompts;
use crate::request::{self, GenerateRequest};
use crate::response;
use crate::retry;
use crate::transport::HttpTransport;

/// The AI orchestration client. Stateless across operations: every call
/// resolves its own credential, so there is no ambient "current client"
/// keyed by a hidden key.
pub struct AiClient {
    transport: Arc<dyn Transport>,
    stored: Option<Credential>,
    strip_images_on_invalid: bool,
}

impl AiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            stored: None,
            strip_images_on_invalid: true,
        }
    }

    /// Direct-call client with the env-sourced fallback credential.
    pub fn from_env() -> Self {
        Self::new(Arc::new(HttpTransport::new())).with_stored_credential(config::stored_credential())
    }

    pub fn with_stored_credential(mut self, credential: Option<Credential>) -> Self {
        self.stored = credential;
        self
    }

    /// Gate for the retry-without-images fallback on rejected image
    /// requests. On by default; disable when the provider's error taxonomy
    /// makes 400 mean something other than "these parts are unacceptable".
    pub fn with_image_fallback(mut self, enabled: bool) -> Self {
        self.strip_images_on_invalid = enabled;
        self
    }

    /// Resolution happens per call; the key-shape check happens here, when
    /// the request is assembled.
    fn credential_for(
        &self,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Credential, AiError> {
        let resolved = credential::resolve(overrides, self.stored.as_ref())?;
        resolved.ensure_key_format()?;
        Ok(resolved)
    }

    async fn call(
        &self,
        credential: &Credential,
        request: &GenerateRequest,
    ) -> Result<Value, AiError> {
        retry::with_backoff(request.model, || async move {
            self.transport
                .generate_content(credential, request.model, &request.body)
                .await
                .map_err(|err| error::classify(&err))
        })
        .await
    }

    /// Probe the text and image models with minimal pings. Never fails:
    /// anything that goes wrong, including a missing credential, degrades
    /// the status instead.
    pub async fn connection_test(
        &self,
        overrides: Option<&CredentialOverride>,
    ) -> ConnectionTestResult {
        let started = Instant::now();
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let credential = match self.credential_for(overrides) {
            Ok(credential) => credential,
            Err(err) => {
                tracing::error!(error = %err, "connection test aborted");
                return ConnectionTestResult {
                    text_model_ok: false,
                    image_model_ok: false,
                    latency_ms: started.elapsed().as_millis() as u64,
                    status: ConnectionStatus::Offline,
                    timestamp,
                };
            }
        };

        let text_probe = request::ping(GEMINI_PING_MODEL, prompts::PING_PROMPT);
        let text_model_ok = match self
            .transport
            .generate_content(&credential, text_probe.model, &text_probe.body)
            .await
        {
            Ok(payload) => response::has_text(&payload),
            Err(err) => {
                tracing::error!(error = %err.message, "text model probe failed");
                false
            }
        };

        let image_probe = request::ping(GEMINI_IMAGE_MODEL, prompts::IMAGE_PING_PROMPT);
        let image_model_ok = self
            .transport
            .generate_content(&credential, image_probe.model, &image_probe.body)
            .await
            .is_ok();

        let status = match (text_model_ok, image_model_ok) {
            (true, true) => ConnectionStatus::Online,
            (false, false) => ConnectionStatus::Offline,
            _ => ConnectionStatus::Partial,
        };

        ConnectionTestResult {
            text_model_ok,
            image_model_ok,
            latency_ms: started.elapsed().as_millis() as u64,
            status,
            timestamp,
        }
    }

    /// Infer the five product fields from reference images and/or free
    /// text. `Ok(None)` when the model returned no usable candidate.
    pub async fn analyze_product(
        &self,
        images: &[ImageData],
        context: Option<&str>,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Option<ProductDraft>, AiError> {
        let credential = self.credential_for(overrides)?;
        let payload = self.call(&credential, &request::analysis(images, context)).await?;
        match response::structured_json(&payload)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
                AiError::MalformedModelOutput {
                    detail: err.to_string(),
                }
            }),
        }
    }

    /// Plan the detail page. Segment ids are assigned here, unique within
    /// one planning call by the index suffix.
    pub async fn plan_detail_page(
        &self,
        product: &ProductInfo,
        overrides: Option<&CredentialOverride>,
    ) -> Result<Vec<DetailImageSegment>, AiError> {
        let credential = self.credential_for(overrides)?;
        let payload = self.call(&credential, &request::plan(product)).await?;
        let value = match response::structured_json(&payload)? {
            None => return Ok(Vec::new()),
            Some(value) => value,
        };
        let mut segments: Vec<DetailImageSegment> =
            serde_json::from_value(value).map_err(|err| AiError::MalformedModelOutput {
                detail: err.to_string(),
            })?;

        let stamp = OffsetDateTime::now_utc().unix_timestamp();
        for (index, segment) in segments.iter_mut().enumerate() {
            segment.id = format!("seg-{stamp}-{index}");
            segment.state = GenerationState::Idle;
        }
        Ok(segments)
    }

    /// Render one image. When an image-attached request is rejected as
    /// invalid, the same prompt is retried once without the reference
    /// images before giving up.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference_images: &[ImageData],
        aspect_ratio: &str,
        overrides: Option<&CredentialOverride>,
    ) -> Result<String, AiError> {
        let credential = self.credential_for(overrides)?;
        let attached = request::image(prompt, reference_images, aspect_ratio);
        match self.call(&credential, &attached).await {
            Ok(payload) => response::inline_image(&payload),
            Err(AiError::InvalidRequest { .. })
                if !reference_images.is_empty() && self.strip_images_on_invalid =>
            {
                tracing::warn!(
                    "image request rejected with references attached, retrying without them"
                );
                let text_only = request::image(prompt, &[], aspect_ratio);
                let payload = self.call(&credential, &text_only).await?;
                response::inline_image(&payload)
            }
            Err(err) => Err(err),
        }
    }

    /// 9:16 section render. Reference images are capped at three, the most
    /// the image model accepts before quality drops.
    pub async fn generate_section_image(
        &self,
        segment: &DetailImageSegment,
        reference_images: &[ImageData],
        overrides: Option<&CredentialOverride>,
    ) -> Result<String, AiError> {
        let capped = &reference_images
            [..reference_images.len().min(MAX_SECTION_REFERENCE_IMAGES)];
        self.generate_image(
            &prompts::section_image_prompt(segment),
            capped,
            SECTION_ASPECT_RATIO,
            overrides,
        )
        .await
    }

    /// 1:1 standalone thumbnail.
    pub async fn generate_thumbnail(
        &self,
        product_name: &str,
        features: &str,
        custom_instructions: &str,
        reference_image: Option<&ImageData>,
        overrides: Option<&CredentialOverride>,
    ) -> Result<String, AiError> {
        let references: Vec<ImageData> = reference_image.cloned().into_iter().collect();
        self.generate_image(
            &prompts::thumbnail_prompt(product_name, features, custom_instructions),
            &references,
            THUMBNAIL_ASPECT_RATIO,
            overrides,
        )
        .await
    }
}
