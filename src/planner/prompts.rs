use crate::{
    models::{ContentCategory, GenerationRequest, PromptStyle},
    registry::{ProviderProfile, ProviderRegistry},
};

/// Rough token count: whitespace words plus a third for sub-word splits.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    words + words / 3
}

/// Trims `prompt` to at most `max_tokens` estimated tokens, on word boundaries.
pub fn fit_to_budget(prompt: &str, max_tokens: usize) -> String {
    if estimate_tokens(prompt) <= max_tokens {
        return prompt.trim().to_string();
    }
    let max_words = (max_tokens * 3 / 4).max(1);
    prompt
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes a surrounding markdown code fence, if any.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// The subject line shared by every synthesized prompt.
fn subject(request: &GenerationRequest) -> String {
    let mut parts = vec![request.prompt().trim().trim_end_matches('.').to_string()];
    if let Some(theme) = request.theme() {
        parts.push(format!("Theme: {}", theme));
    }
    let constraints = request.constraints();
    if let Some(background) = &constraints.background {
        parts.push(format!("Background: {}", background));
    }
    if !constraints.text.is_empty() {
        let quoted: Vec<String> = constraints.text.iter().map(|t| format!("'{}'", t)).collect();
        parts.push(format!("Include the text {}", quoted.join(" and ")));
    }
    if !constraints.objects.is_empty() {
        parts.push(format!("Include {}", constraints.objects.join(", ")));
    }
    parts.join(". ")
}

/// Builds a provider-specific prompt in the vocabulary its model responds to.
pub fn synthesize(profile: &ProviderProfile, request: &GenerationRequest) -> String {
    let ratio = request.aspect_ratio();
    let styling = match profile.style {
        PromptStyle::Photographic => format!(
            "Professional photograph in a {} frame, shot on a full-frame camera with an 85mm f/1.4 lens, \
             soft golden-hour key light with gentle fill, shallow depth of field, natural skin tones, \
             cinematic color grading, sharp focus",
            ratio
        ),
        PromptStyle::Typographic => format!(
            "Layout-driven design in {} format with a clear visual hierarchy, precise and fully legible \
             typography, bold sans-serif headings, balanced white space, brand-consistent color palette, \
             print-ready high resolution",
            ratio
        ),
        PromptStyle::Artistic => format!(
            "Stylized digital painting in a {} composition, dramatic lighting, vibrant colors, \
             dynamic perspective, concept-art detail",
            ratio
        ),
        PromptStyle::Environmental => format!(
            "Expansive natural scene in {} format, detailed terrain and textures, atmospheric light \
             and weather, landscape photography technique, high resolution",
            ratio
        ),
    };
    format!("{}. {}.", subject(request), styling)
}

pub fn default_rationale(
    tier: usize,
    category: Option<ContentCategory>,
    profile: &ProviderProfile,
) -> String {
    let rank = match tier {
        1 => "Primary",
        2 => "Secondary",
        _ => "Tertiary",
    };
    match category {
        Some(category) => format!(
            "{} choice for {} content: {}",
            rank, category, profile.strengths
        ),
        None => format!("{} fallback by aspect-ratio compatibility", rank),
    }
}

/// Instruction for the reasoning model: classify the request and write
/// one prompt per suitable provider.
pub fn classification_prompt(request: &GenerationRequest, registry: &ProviderRegistry) -> String {
    let categories: Vec<&str> = ContentCategory::ALL.iter().map(|c| c.as_str()).collect();
    let theme = request.theme().unwrap_or("no specific theme");
    let constraints = request.constraints();
    let layers = if constraints.is_empty() {
        "none".to_string()
    } else {
        serde_json::to_string(constraints).unwrap_or_default()
    };

    format!(
        r#"You are a prompt engineer choosing image generation models.

AVAILABLE MODELS:
{catalogue}
INPUT:
- user_prompt: "{prompt}"
- aspect_ratio: "{ratio}"
- theme: "{theme}"
- fixed layers (must appear exactly): {layers}

TASK:
1. Classify the content as one of: {categories}.
2. Pick up to 3 models that support the aspect ratio, best first.
3. For each, write an enhanced prompt that uses that model's strengths and stays within its token limit.
4. Return ONLY this JSON, no markdown:
{{"intent": "<category>", "candidates": [{{"provider": "<model name>", "prompt": "<enhanced prompt>", "rationale": "<why>"}}]}}"#,
        catalogue = registry.catalogue(),
        prompt = request.prompt(),
        ratio = request.aspect_ratio(),
        theme = theme,
        layers = layers,
        categories = categories.join(" | "),
    )
}
