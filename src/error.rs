use thiserror::Error;

use crate::constants::ERROR_MESSAGE_PREVIEW_CHARS;

/// Error taxonomy surfaced to the caller. Messages are the user-facing
/// Korean strings; never the raw provider exception text alone.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("Google API Key가 설정되지 않았습니다.")]
    CredentialMissing,

    #[error("유효하지 않은 API Key 형식입니다. 'AIza'로 시작하는 키를 입력해주세요.")]
    CredentialInvalidFormat,

    #[error("⚠️ API 사용량이 초과되었습니다 (Quota Exceeded).\n잠시 후 다시 시도하거나, Google Cloud 콘솔에서 결제 계정과 할당량을 확인해주세요.")]
    RateLimited,

    #[error("⚠️ AI 서버가 혼잡합니다 (System Overload).\n잠시 후 다시 시도해주세요.")]
    ProviderOverloaded,

    #[error("⚠️ API 키 권한 오류 (Permission Denied).\nAPI 키가 올바른지, 결제 계정이 연결된 프로젝트인지 확인해주세요.")]
    PermissionDenied,

    #[error("⚠️ 잘못된 요청입니다 (Invalid Request): {message}")]
    InvalidRequest { message: String },

    #[error("⚠️ 안전 필터에 의해 차단되었습니다 (Safety Violation).\n부적절한 내용이 포함되어 있는지 확인해주세요.")]
    ContentFiltered,

    #[error("모델 응답을 해석하지 못했습니다: {detail}")]
    MalformedModelOutput { detail: String },

    #[error("이미지 생성 결과가 없습니다.")]
    NoResultProduced,

    #[error("⚠️ 오류가 발생했습니다: {message}")]
    Unclassified { message: String },
}

impl AiError {
    /// Transient kinds are retried by the backoff engine; everything else
    /// propagates immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::RateLimited | AiError::ProviderOverloaded)
    }
}

/// Raw failure from the transport boundary, before classification.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Map a raw provider failure onto the taxonomy. Status codes win over
/// message substrings; substrings cover providers that tunnel the real
/// status through an HTTP 200 error body.
pub fn classify(err: &ProviderError) -> AiError {
    let status = err.status;
    let message = &err.message;

    if status == Some(503) || message.contains("overloaded") || message.contains("UNAVAILABLE") {
        return AiError::ProviderOverloaded;
    }
    if status == Some(429) || message.contains("quota") || message.contains("429") {
        return AiError::RateLimited;
    }
    if status == Some(403)
        || message.contains("403")
        || message.contains("PERMISSION_DENIED")
        || message.contains("API key")
    {
        return AiError::PermissionDenied;
    }
    if status == Some(400) || message.contains("400") || message.contains("INVALID_ARGUMENT") {
        return AiError::InvalidRequest {
            message: truncate_chars(message, ERROR_MESSAGE_PREVIEW_CHARS).to_string(),
        };
    }
    if message.contains("SAFETY") {
        return AiError::ContentFiltered;
    }
    AiError::Unclassified {
        message: truncate_chars(message, ERROR_MESSAGE_PREVIEW_CHARS).to_string(),
    }
}

/// Truncate on a char boundary so multi-byte provider messages never panic.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(status: Option<u16>, message: &str) -> AiError {
        classify(&ProviderError::new(status, message))
    }

    #[test]
    fn classifies_by_status_code() {
        assert_eq!(kind(Some(503), "Service Unavailable"), AiError::ProviderOverloaded);
        assert_eq!(kind(Some(429), "Too Many Requests"), AiError::RateLimited);
        assert_eq!(kind(Some(403), "Forbidden"), AiError::PermissionDenied);
        assert!(matches!(kind(Some(400), "Bad Request"), AiError::InvalidRequest { .. }));
    }

    #[test]
    fn classifies_by_message_substring() {
        assert_eq!(kind(None, "The model is overloaded"), AiError::ProviderOverloaded);
        assert_eq!(kind(None, "UNAVAILABLE"), AiError::ProviderOverloaded);
        assert_eq!(kind(None, "Resource exhausted: quota"), AiError::RateLimited);
        assert_eq!(kind(None, "PERMISSION_DENIED"), AiError::PermissionDenied);
        assert!(matches!(kind(None, "INVALID_ARGUMENT"), AiError::InvalidRequest { .. }));
        assert_eq!(kind(None, "Blocked by SAFETY settings"), AiError::ContentFiltered);
    }

    #[test]
    fn rejected_key_maps_to_permission_denied() {
        // "API key not valid" arrives with status 400 but is a key problem,
        // not a request-shape problem.
        assert_eq!(
            kind(Some(400), "API key not valid. Please pass a valid API key."),
            AiError::PermissionDenied
        );
    }

    #[test]
    fn unknown_errors_carry_truncated_message() {
        let long = "x".repeat(500);
        match kind(Some(500), &long) {
            AiError::Unclassified { message } => assert_eq!(message.chars().count(), 100),
            other => panic!("expected Unclassified, got {other:?}"),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let korean = "오류".repeat(120);
        let cut = truncate_chars(&korean, 100);
        assert_eq!(cut.chars().count(), 100);
    }

    #[test]
    fn only_transient_kinds_are_retryable() {
        assert!(AiError::RateLimited.is_retryable());
        assert!(AiError::ProviderOverloaded.is_retryable());
        assert!(!AiError::PermissionDenied.is_retryable());
        assert!(!AiError::ContentFiltered.is_retryable());
        assert!(!AiError::NoResultProduced.is_retryable());
        assert!(!AiError::InvalidRequest { message: String::new() }.is_retryable());
    }
}
