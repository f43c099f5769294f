//! Poster copy: asks the reasoning model for the selected text fields and
//! turns finished copy into a single image prompt.

use crate::{
    clients::ReasoningBackend,
    error::{PosterError, Result},
    models::{PosterField, PosterFields, PosterRequest, ReasoningRequest},
    planner::prompts::strip_code_fences,
};
use std::sync::Arc;

const DEFAULT_CUSTOM_PROMPT: &str = "Design a professional educational poster for a tech program.";
const DEFAULT_THEME: &str =
    "A clean, tech-inspired background with smooth gradients and soft lighting effects.";

pub struct Copywriter {
    reasoner: Arc<dyn ReasoningBackend>,
    max_tokens: i32,
    temperature: f32,
}

impl Copywriter {
    pub fn new(reasoner: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            reasoner,
            max_tokens: 2000,
            temperature: 0.7,
        }
    }

    pub fn with_sampling(mut self, max_tokens: i32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub async fn generate_fields(&self, request: &PosterRequest) -> Result<PosterFields> {
        let selected = request.selected_fields();
        log::info!(
            "✍️  Generating poster copy for {} field(s) with {}",
            selected.len(),
            self.reasoner.model_id()
        );

        let reasoning = ReasoningRequest::new(request.main_prompt.clone())
            .with_system(system_prompt(&selected, request.theme.as_deref()))
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);
        let raw = self.reasoner.complete(&reasoning).await?;

        let mut fields: PosterFields = serde_json::from_str(strip_code_fences(&raw))
            .map_err(|e| PosterError::Response(format!("copy model returned invalid JSON: {}", e)))?;
        fields.retain_selected(&selected);

        if let Some(custom) = &request.custom_prompt {
            if !custom.trim().is_empty() {
                fields.custom_prompt = Some(custom.clone());
            }
        }

        log::debug!("Poster copy: {:?}", fields);
        Ok(fields)
    }
}

fn theme_instruction(theme: Option<&str>) -> String {
    match theme.map(str::trim).filter(|t| !t.is_empty()) {
        Some(theme) => format!(
            "The user provided a rough theme: '{}'. Expand it into a visually detailed, layout-aware \
             background description for image generation. Include mood, colors and scene composition, \
             and avoid vague words like 'modern'. Return it in the key 'suggested_theme'.",
            theme
        ),
        None => "The user did not provide a theme. Based on the custom_prompt's intent, write a vivid \
                 scene composition with mood, lighting, color palette and visual motifs, and return it \
                 in 'suggested_theme'."
            .to_string(),
    }
}

fn system_prompt(selected: &[PosterField], theme: Option<&str>) -> String {
    let names: Vec<&str> = selected.iter().map(|f| f.key()).collect();
    let keys: Vec<String> = std::iter::once("custom_prompt")
        .chain(names.iter().copied())
        .chain(std::iter::once("suggested_theme"))
        .map(|k| format!("\"{}\"", k))
        .collect();
    let constraints: Vec<String> = selected
        .iter()
        .map(|f| format!("- \"{}\": {}", f.key(), f.constraint()))
        .collect();
    let field_list = if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    };

    format!(
        r#"You are a professional poster copywriter for educational and marketing visuals.

TASK:
1. Expand the user's main prompt into a vivid, action-oriented "custom_prompt" describing the poster scene: participants, actions, environment and mood.
2. Write content for ONLY these fields: {fields}.
3. {theme}
4. Output a JSON object with exactly these keys: {keys}.

RULES:
- Do not include unselected fields.
- Respect every length limit below.
- No headers, explanations or markdown. Return the JSON object only.

FIELD CONSTRAINTS:
{constraints}"#,
        fields = field_list,
        theme = theme_instruction(theme),
        keys = keys.join(", "),
        constraints = constraints.join("\n"),
    )
}

/// Assembles the image prompt for a poster from its finished copy.
pub fn build_image_prompt(fields: &PosterFields, theme: Option<&str>) -> String {
    let custom_prompt = fields
        .custom_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_CUSTOM_PROMPT);
    let background = fields
        .suggested_theme
        .as_deref()
        .or(theme)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_THEME);

    let layout: Vec<String> = PosterField::ALL
        .iter()
        .filter_map(|field| {
            fields
                .get(*field)
                .map(|text| format!("- {}: \"{}\"", field.placement(), text))
        })
        .collect();

    let mut sections = vec![custom_prompt.to_string()];
    if !layout.is_empty() {
        sections.push(format!("Layout:\n{}", layout.join("\n")));
    }
    sections.push(
        "Critical instructions:\n\
         - Do not render field labels such as \"Success Metrics\", \"Target Audience\" or \"Testimonial\".\n\
         - Text appears naturally as part of the poster design, not as form layout or metadata.\n\
         - No overlapping, distortion or gibberish. Fonts are clean, sans-serif and fully legible."
            .to_string(),
    );
    sections.push(format!("Background theme:\n{}", background));
    sections.push(
        "Typography and composition:\n\
         - Fonts: bold, sans-serif, clean, fully legible.\n\
         - Layout: balanced, white-space aware, no overlaps."
            .to_string(),
    );
    sections.join("\n\n")
}
