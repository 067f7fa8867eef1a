//! Shared constants for the modusangse core.

pub const GEMINI_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const GEMINI_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const GEMINI_PING_MODEL: &str = "gemini-3-flash-preview";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_PREFIX: &str = "AIza";

pub const MAX_RETRIES: usize = 3;
pub const BACKOFF_BASE_SECONDS: f64 = 2.0;
pub const BACKOFF_CAP_SECONDS: f64 = 16.0;

pub const DEFAULT_CONCURRENCY: usize = 2;
pub const MAX_REFERENCE_IMAGES: usize = 5;
pub const MAX_SECTION_REFERENCE_IMAGES: usize = 3;

pub const SECTION_ASPECT_RATIO: &str = "9:16";
pub const THUMBNAIL_ASPECT_RATIO: &str = "1:1";
pub const GENERATED_IMAGE_SIZE: &str = "1K";

pub const ERROR_MESSAGE_PREVIEW_CHARS: usize = 100;
