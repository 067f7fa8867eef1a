use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::credential::Credential;
use crate::error::ProviderError;

/// Page length selector for the detail page plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLength {
    Five,
    Seven,
    Nine,
    Twelve,
    #[default]
    Auto,
}

impl PageLength {
    /// Fixed section count, or `None` for auto mode.
    pub fn section_count(&self) -> Option<usize> {
        match self {
            PageLength::Five => Some(5),
            PageLength::Seven => Some(7),
            PageLength::Nine => Some(9),
            PageLength::Twelve => Some(12),
            PageLength::Auto => None,
        }
    }
}

impl Serialize for PageLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.section_count() {
            Some(count) => serializer.serialize_u64(count as u64),
            None => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for PageLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => match n.as_u64() {
                Some(5) => Ok(PageLength::Five),
                Some(7) => Ok(PageLength::Seven),
                Some(9) => Ok(PageLength::Nine),
                Some(12) => Ok(PageLength::Twelve),
                other => Err(D::Error::custom(format!(
                    "unsupported page length {other:?}"
                ))),
            },
            Value::String(s) if s == "auto" => Ok(PageLength::Auto),
            other => Err(D::Error::custom(format!("unsupported page length {other}"))),
        }
    }
}

/// Inline image payload: a MIME type plus a Base64 body. Accepts both wire
/// forms — a `data:` URI with an explicit MIME, or a bare Base64 string
/// defaulting to `image/jpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub data: String,
}

impl ImageData {
    pub fn parse(raw: &str) -> Self {
        let re = Regex::new(r"^data:([a-zA-Z0-9]+/[a-zA-Z0-9.+-]+);base64,(.+)$").unwrap();
        if let Some(caps) = re.captures(raw) {
            return Self {
                mime_type: caps[1].to_string(),
                data: caps[2].to_string(),
            };
        }
        Self {
            mime_type: "image/jpeg".to_string(),
            data: raw.to_string(),
        }
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ImageData::parse(&raw))
    }
}

/// User-entered product data. Consumed, never mutated, by this core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub name: String,
    pub category: String,
    pub price: String,
    pub features: String,
    pub target_audience: String,
    #[serde(default)]
    pub reference_images: Vec<ImageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_context: Option<String>,
    #[serde(default)]
    pub length: PageLength,
}

/// The five fields the analysis operation infers. Partial `ProductInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub price: String,
    pub features: String,
    pub target_audience: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
    Error,
}

/// One section of the detail page: planned copy plus an independently
/// generated image. `image_url`, `state` and `error_message` are written
/// only by the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailImageSegment {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(rename = "logicalSections")]
    pub logical_section: String,
    pub key_message: String,
    pub visual_prompt: String,
    pub visual_prompt_ko: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub state: GenerationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionStatus {
    Online,
    Partial,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub text_model_ok: bool,
    pub image_model_ok: bool,
    pub latency_ms: u64,
    pub status: ConnectionStatus,
    pub timestamp: String,
}

/// Boundary with the AI provider. One adapter per deployment mode
/// (direct-call or server-proxied); the rest of the core is polymorphic
/// over this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(
        &self,
        credential: &Credential,
        model: &str,
        body: &Value,
    ) -> Result<Value, ProviderError>;
}
