//! Provider payload construction for the four operation shapes.

use serde_json::{json, Value};

use crate::constants::{
    GEMINI_ANALYSIS_MODEL, GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL, GENERATED_IMAGE_SIZE,
};
use crate::core::{ImageData, ProductInfo};
use crate::prompts;

pub const ANALYSIS_FIELDS: [&str; 5] = ["name", "category", "price", "features", "targetAudience"];
pub const SEGMENT_FIELDS: [&str; 5] = [
    "title",
    "logicalSections",
    "keyMessage",
    "visualPrompt",
    "visualPromptKo",
];

/// A fully assembled `generateContent` payload: target model plus body.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: &'static str,
    pub body: Value,
}

fn string_properties(fields: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    for field in fields {
        properties.insert(field.to_string(), json!({ "type": "STRING" }));
    }
    Value::Object(properties)
}

fn image_part(image: &ImageData) -> Value {
    json!({
        "inline_data": {
            "mime_type": image.mime_type,
            "data": image.data,
        }
    })
}

/// Image parts first, trailing text part last.
fn content_parts(images: &[ImageData], text: &str) -> Value {
    let mut parts: Vec<Value> = images.iter().map(image_part).collect();
    parts.push(json!({ "text": text }));
    json!([{ "parts": parts }])
}

/// Minimal text-only probe. Kept small so a connection test never burns
/// meaningful quota.
pub fn ping(model: &'static str, prompt: &str) -> GenerateRequest {
    GenerateRequest {
        model,
        body: json!({ "contents": content_parts(&[], prompt) }),
    }
}

pub fn analysis(images: &[ImageData], context: Option<&str>) -> GenerateRequest {
    let has_images = !images.is_empty();
    let prompt = prompts::analysis_prompt(has_images, context);
    GenerateRequest {
        model: if has_images {
            GEMINI_ANALYSIS_MODEL
        } else {
            GEMINI_TEXT_MODEL
        },
        body: json!({
            "contents": content_parts(images, &prompt),
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": string_properties(&ANALYSIS_FIELDS),
                    "required": ANALYSIS_FIELDS,
                }
            }
        }),
    }
}

pub fn plan(product: &ProductInfo) -> GenerateRequest {
    let prompt = prompts::planning_prompt(product);
    GenerateRequest {
        model: GEMINI_TEXT_MODEL,
        body: json!({
            "contents": content_parts(&[], &prompt),
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": string_properties(&SEGMENT_FIELDS),
                        "required": SEGMENT_FIELDS,
                    }
                }
            }
        }),
    }
}

pub fn image(prompt: &str, reference_images: &[ImageData], aspect_ratio: &str) -> GenerateRequest {
    GenerateRequest {
        model: GEMINI_IMAGE_MODEL,
        body: json!({
            "contents": content_parts(reference_images, prompt),
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": aspect_ratio,
                    "imageSize": GENERATED_IMAGE_SIZE,
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECTION_ASPECT_RATIO;

    fn parts(request: &GenerateRequest) -> &Vec<Value> {
        request.body["contents"][0]["parts"].as_array().unwrap()
    }

    #[test]
    fn analysis_schema_requires_exactly_the_five_product_fields() {
        let request = analysis(&[], Some("camping gear"));
        let required = request.body["generationConfig"]["responseSchema"]["required"]
            .as_array()
            .unwrap();
        let names: Vec<&str> = required.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(names, ANALYSIS_FIELDS);
    }

    #[test]
    fn analysis_model_depends_on_image_presence() {
        let images = vec![ImageData::parse("/9j/4AAQ")];
        assert_eq!(analysis(&images, None).model, GEMINI_ANALYSIS_MODEL);
        assert_eq!(analysis(&[], Some("text only")).model, GEMINI_TEXT_MODEL);
    }

    #[test]
    fn image_parts_precede_the_trailing_text_part() {
        let images = vec![
            ImageData::parse("data:image/png;base64,AAAA"),
            ImageData::parse("BBBB"),
        ];
        let request = analysis(&images, None);
        let parts = parts(&request);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert!(parts[2]["text"].is_string());
    }

    #[test]
    fn plan_schema_is_an_array_of_five_field_objects() {
        let request = plan(&ProductInfo::default());
        let schema = &request.body["generationConfig"]["responseSchema"];
        assert_eq!(schema["type"], "ARRAY");
        let required = schema["items"]["required"].as_array().unwrap();
        let names: Vec<&str> = required.iter().map(|v| v.as_str().unwrap()).collect();
        assert_eq!(names, SEGMENT_FIELDS);
    }

    #[test]
    fn image_request_carries_aspect_ratio_and_size() {
        let request = image("a lantern at dusk", &[], SECTION_ASPECT_RATIO);
        let config = &request.body["generationConfig"]["imageConfig"];
        assert_eq!(config["aspectRatio"], "9:16");
        assert_eq!(config["imageSize"], "1K");
        assert_eq!(request.model, GEMINI_IMAGE_MODEL);
    }

    #[test]
    fn ping_is_a_single_text_part() {
        let request = ping(crate::constants::GEMINI_PING_MODEL, "ping");
        let parts = parts(&request);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "ping");
        assert!(request.body.get("generationConfig").is_none());
    }
}
