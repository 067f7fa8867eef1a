//! Prompt text for the four model operations.

use crate::core::{DetailImageSegment, PageLength, ProductInfo};

pub const PING_PROMPT: &str = "ping";
pub const IMAGE_PING_PROMPT: &str = "check model capability and latency";

pub fn analysis_prompt(has_images: bool, context: Option<&str>) -> String {
    let context_block = if has_images {
        let mut block = "Analyze the provided product images.".to_string();
        if let Some(context) = context {
            block.push_str(&format!(
                "\nAdditional User Context: \"{context}\" (Use this hint to better understand the product)."
            ));
        }
        block
    } else {
        format!(
            "Analyze the following product description. NO images provided, so rely solely on the text.\nProduct Description: \"{}\"",
            context.unwrap_or_default()
        )
    };

    format!(
        r#"{context_block}

Task: Extract or infer product details for a Korean e-commerce listing.

Extract or infer the following details:
1. name: A catchy product name in Korean.
2. category: The product category (e.g., 패션, 식품).
3. price: An estimated price range and a plausible promotion (e.g., "39,000원 (런칭특가 20%)").
4. features: 3-5 key selling points or visual features in Korean.
5. targetAudience: The most likely target demographic and persona (e.g., "트렌드에 민감한 20대 여성", "캠핑을 즐기는 3040 남성").

All response values MUST be natural Korean."#
    )
}

/// Section table communicated to the planner. Every variant pins the final
/// section to the Information Disclosure block (제품정보고시).
pub fn structure_guide(length: PageLength) -> &'static str {
    match length {
        PageLength::Five => {
            "5 Sections: 1. Hook, 2. Solution, 3. Clarity, 4. Service, 5. Information Disclosure (제품정보고시)."
        }
        PageLength::Seven => {
            "7 Sections: 1. Hook, 2. Solution, 3. Social Proof, 4. Detail Deep Dive, 5. Clarity, 6. Service, 7. Information Disclosure (제품정보고시)."
        }
        PageLength::Nine => {
            "9 Sections: 1. Hook, 2. Brand Story, 3. Solution, 4. Competitor Comparison, 5. Social Proof, 6. Detail Deep Dive, 7. Clarity, 8. Service, 9. Information Disclosure (제품정보고시)."
        }
        PageLength::Twelve => {
            "12 Sections: 1. Hook (Problem), 2. Brand Story, 3. Solution (Concept), 4. Solution (Details), 5. Competitor Comparison, 6. Social Proof (Reviews), 7. Deep Dive (Visuals 1), 8. Deep Dive (Visuals 2), 9. Clarity (Specs), 10. FAQ, 11. Service (Delivery/AS), 12. Information Disclosure (제품정보고시)."
        }
        PageLength::Auto => {
            "Auto: Analyze the product category. Usually 6-8 sections. IMPORTANT: The VERY LAST section must ALWAYS be 'Product Information Disclosure (제품정보고시)'."
        }
    }
}

pub fn planning_prompt(product: &ProductInfo) -> String {
    let context_line = product
        .analysis_context
        .as_deref()
        .map(|context| format!("- Additional Context: {context}\n"))
        .unwrap_or_default();

    format!(
        r#"You are an expert Korean E-commerce Strategist. Plan a high-conversion product detail page.

Product Details:
- Name: {name}
- Category: {category}
- Features: {features}
- Target Audience: {audience}
- Price/Promo: {price}
{context_line}
MANDATORY RULE:
- The final section in the list MUST be the "Product Information Disclosure" (제품정보고시).

Requirement:
- Structure: {guide}
- STRICT CONSTRAINT: All 'keyMessage' (copy) MUST be in natural, persuasive KOREAN (Hangul).
- 'visualPrompt': Describe the image in English for an image generation model.
- 'visualPromptKo': A natural Korean translation of the 'visualPrompt'.
- 'logicalSections': A short tag (Hook, Solution, Trust, Info)."#,
        name = product.name,
        category = product.category,
        features = product.features,
        audience = product.target_audience,
        price = product.price,
        guide = structure_guide(product.length),
    )
}

pub fn section_image_prompt(segment: &DetailImageSegment) -> String {
    format!(
        r#"Create a high-quality vertical e-commerce image (9:16 aspect ratio).

Context: {visual}
Key Message to include in Korean: "{message}"

Typography Guidelines:
- Use modern, professional, and high-end Korean Sans-serif typography.
- Ensure any rendered text is highly legible, aesthetically pleasing, and balanced.
- Style: Premium commercial photography layout.
- If the context is "Product Information Disclosure", use a clean, structured infographic style with clear data visualization."#,
        visual = segment.visual_prompt,
        message = segment.key_message,
    )
}

pub fn thumbnail_prompt(product_name: &str, features: &str, custom_instructions: &str) -> String {
    let instructions = if custom_instructions.is_empty() {
        "A clean and professional commercial look"
    } else {
        custom_instructions
    };

    format!(
        r#"Create a catchy e-commerce thumbnail (1:1 aspect ratio).
Product Name: {product_name}
Key Features: {features}
User Design Instructions: {instructions}

Typography Guidelines:
- Use bold, modern, and highly readable Korean fonts for the product name and features.
- The design should be premium and balanced.
- Ensure high contrast and high legibility for mobile users.
- Focus on making the product stand out."#
    )
}
