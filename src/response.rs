//! Extraction of structured JSON and inline images from provider responses.

use serde_json::Value;

use crate::error::AiError;

fn first_candidate(payload: &Value) -> Option<&Value> {
    payload.get("candidates")?.as_array()?.first()
}

fn candidate_parts(candidate: &Value) -> Option<&Vec<Value>> {
    candidate.get("content")?.get("parts")?.as_array()
}

fn candidate_text(candidate: &Value) -> Option<&str> {
    candidate_parts(candidate)?
        .iter()
        .find_map(|part| part.get("text").and_then(|t| t.as_str()))
}

/// Strip a leading ```json / ``` fence and a trailing ``` fence, tolerating
/// their absence.
pub fn clean_json_markup(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        trimmed
    };
    clean.strip_suffix("```").unwrap_or(clean).trim()
}

/// Parse the first candidate's text as JSON. `Ok(None)` means the model
/// produced no usable candidate — a valid outcome distinct from a transport
/// failure. A candidate that fails to parse is a malformed model output,
/// never a silently empty object.
pub fn structured_json(payload: &Value) -> Result<Option<Value>, AiError> {
    let candidate = match first_candidate(payload) {
        Some(candidate) => candidate,
        None => return Ok(None),
    };
    let text = match candidate_text(candidate) {
        Some(text) => text,
        None => return Ok(None),
    };
    serde_json::from_str(clean_json_markup(text))
        .map(Some)
        .map_err(|err| AiError::MalformedModelOutput {
            detail: err.to_string(),
        })
}

/// Scan all parts of the first candidate for inline binary image data and
/// return the first hit as a ready-to-use data URI. The REST API answers in
/// camelCase; the snake_case spelling is accepted for proxied responses that
/// echo the request convention.
pub fn inline_image(payload: &Value) -> Result<String, AiError> {
    let parts = first_candidate(payload)
        .and_then(candidate_parts)
        .ok_or(AiError::NoResultProduced)?;

    for part in parts {
        let inline = part
            .get("inlineData")
            .or_else(|| part.get("inline_data"))
            .and_then(|v| v.as_object());
        if let Some(inline) = inline {
            let mime = inline
                .get("mimeType")
                .or_else(|| inline.get("mime_type"))
                .and_then(|v| v.as_str())
                .unwrap_or("image/png");
            let data = inline
                .get("data")
                .and_then(|v| v.as_str())
                .ok_or(AiError::NoResultProduced)?;
            return Ok(format!("data:{mime};base64,{data}"));
        }
    }
    Err(AiError::NoResultProduced)
}

/// Whether the response carries any candidate text at all. Used by the
/// connection test, which only checks reachability.
pub fn has_text(payload: &Value) -> bool {
    first_candidate(payload)
        .and_then(candidate_text)
        .is_some_and(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_payload(text: &str) -> Value {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[test]
    fn strips_json_fences_in_all_combinations() {
        assert_eq!(clean_json_markup("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_markup("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(clean_json_markup("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_structured_output() {
        let payload = text_payload("```json\n{\"name\": \"캠핑 랜턴\"}\n```");
        let value = structured_json(&payload).unwrap().unwrap();
        assert_eq!(value["name"], "캠핑 랜턴");
    }

    #[test]
    fn truncated_json_is_a_malformed_output_error() {
        let payload = text_payload("{\"name\": \"캠핑");
        assert!(matches!(
            structured_json(&payload),
            Err(AiError::MalformedModelOutput { .. })
        ));
    }

    #[test]
    fn missing_candidates_is_an_empty_result_not_an_error() {
        assert_eq!(structured_json(&json!({ "candidates": [] })).unwrap(), None);
        assert_eq!(structured_json(&json!({})).unwrap(), None);
    }

    #[test]
    fn extracts_first_inline_image_as_data_uri() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here is your image" },
                { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                { "inlineData": { "mimeType": "image/webp", "data": "BBBB" } }
            ] } }]
        });
        assert_eq!(inline_image(&payload).unwrap(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn accepts_snake_case_inline_data() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [
                { "inline_data": { "mime_type": "image/jpeg", "data": "CCCC" } }
            ] } }]
        });
        assert_eq!(inline_image(&payload).unwrap(), "data:image/jpeg;base64,CCCC");
    }

    #[test]
    fn text_only_response_yields_no_image_error() {
        let payload = text_payload("no image for you");
        assert_eq!(inline_image(&payload), Err(AiError::NoResultProduced));
        assert_eq!(inline_image(&json!({})), Err(AiError::NoResultProduced));
    }
}
