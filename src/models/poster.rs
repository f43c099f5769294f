use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{AspectRatio, GenerationRequest, LayerConstraints};

/// Copy fields a poster can carry, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosterField {
    HeroHeadline,
    HeroSubline,
    Description,
    SuccessMetrics,
    TargetAudience,
    Testimonial,
    Cta,
    CtaLink,
}

impl PosterField {
    pub const ALL: [PosterField; 8] = [
        PosterField::HeroHeadline,
        PosterField::HeroSubline,
        PosterField::Description,
        PosterField::SuccessMetrics,
        PosterField::TargetAudience,
        PosterField::Testimonial,
        PosterField::Cta,
        PosterField::CtaLink,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PosterField::HeroHeadline => "hero_headline",
            PosterField::HeroSubline => "hero_subline",
            PosterField::Description => "description",
            PosterField::SuccessMetrics => "success_metrics",
            PosterField::TargetAudience => "target_audience",
            PosterField::Testimonial => "testimonial",
            PosterField::Cta => "cta",
            PosterField::CtaLink => "cta_link",
        }
    }

    /// Length guidance handed to the copy model.
    pub fn constraint(&self) -> &'static str {
        match self {
            PosterField::HeroHeadline => "max 12 tokens",
            PosterField::HeroSubline => "max 15 tokens",
            PosterField::Description => "max 25 tokens",
            PosterField::SuccessMetrics => "max 20 tokens (pipe-separated stats)",
            PosterField::TargetAudience => "max 15 tokens",
            PosterField::Testimonial => "max 25 tokens (short single-quote quote)",
            PosterField::Cta => "very short and clean",
            PosterField::CtaLink => "very short and clean, independent of cta",
        }
    }

    /// Placement line used when assembling the poster image prompt.
    pub fn placement(&self) -> &'static str {
        match self {
            PosterField::HeroHeadline => "Top center: Large bold heading",
            PosterField::HeroSubline => "Just below: Smaller subheading",
            PosterField::Description => "Center area: Short paragraph",
            PosterField::SuccessMetrics => "Bottom left: Compact highlight of achievements",
            PosterField::TargetAudience => "Bottom right: Brief audience description",
            PosterField::Testimonial => "Lower section: Italicized quote",
            PosterField::Cta => "Bottom center: Button with the text",
            PosterField::CtaLink => "Very bottom: Minimal hyperlink",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PosterRequest {
    pub main_prompt: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub include_hero_headline: bool,
    #[serde(default)]
    pub include_hero_subline: bool,
    #[serde(default)]
    pub include_description: bool,
    #[serde(default)]
    pub include_cta: bool,
    #[serde(default)]
    pub include_testimonial: bool,
    #[serde(default)]
    pub include_success_metrics: bool,
    #[serde(default)]
    pub include_target_audience: bool,
    #[serde(default)]
    pub include_cta_link: bool,
    #[serde(default)]
    pub custom_prompt: Option<String>,
}

impl PosterRequest {
    pub fn new(main_prompt: impl Into<String>) -> Self {
        Self {
            main_prompt: main_prompt.into(),
            ..Default::default()
        }
    }

    pub fn selected_fields(&self) -> Vec<PosterField> {
        PosterField::ALL
            .into_iter()
            .filter(|field| match field {
                PosterField::HeroHeadline => self.include_hero_headline,
                PosterField::HeroSubline => self.include_hero_subline,
                PosterField::Description => self.include_description,
                PosterField::SuccessMetrics => self.include_success_metrics,
                PosterField::TargetAudience => self.include_target_audience,
                PosterField::Testimonial => self.include_testimonial,
                PosterField::Cta => self.include_cta,
                PosterField::CtaLink => self.include_cta_link,
            })
            .collect()
    }
}

/// Poster copy as produced by the copy model (or edited by the user).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosterFields {
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub suggested_theme: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl PosterFields {
    /// Text of a copy field; non-string JSON values are rendered as JSON.
    pub fn get(&self, field: PosterField) -> Option<String> {
        match self.fields.get(field.key())? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn set(&mut self, field: PosterField, value: impl Into<String>) {
        self.fields
            .insert(field.key().to_string(), Value::String(value.into()));
    }

    /// Drops anything the caller did not ask for.
    pub fn retain_selected(&mut self, selected: &[PosterField]) {
        self.fields
            .retain(|key, _| selected.iter().any(|field| field.key() == key));
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PosterImageRequest {
    pub fields: PosterFields,
    #[serde(default)]
    pub theme: Option<String>,
}

fn default_count() -> u32 {
    1
}

/// Body of the text-to-image endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TextToImageRequest {
    pub main_prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub layers: Option<LayerConstraints>,
}

impl From<TextToImageRequest> for GenerationRequest {
    fn from(body: TextToImageRequest) -> Self {
        let mut request = GenerationRequest::new(body.main_prompt, body.aspect_ratio, body.count);
        if let Some(theme) = body.theme {
            request = request.with_theme(theme);
        }
        if let Some(layers) = body.layers {
            request = request.with_constraints(layers);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_fields_follow_layout_order() {
        let request = PosterRequest {
            include_cta: true,
            include_hero_headline: true,
            include_testimonial: true,
            ..PosterRequest::new("Python bootcamp")
        };
        assert_eq!(
            request.selected_fields(),
            vec![
                PosterField::HeroHeadline,
                PosterField::Testimonial,
                PosterField::Cta
            ]
        );
    }

    #[test]
    fn test_poster_fields_flatten() {
        let json = r#"{
            "custom_prompt": "Students coding together",
            "hero_headline": "Code. Collaborate. Succeed!",
            "success_metrics": 95,
            "suggested_theme": "Warm startup office"
        }"#;
        let mut fields: PosterFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.custom_prompt.as_deref(), Some("Students coding together"));
        assert_eq!(
            fields.get(PosterField::HeroHeadline).as_deref(),
            Some("Code. Collaborate. Succeed!")
        );
        assert_eq!(fields.get(PosterField::SuccessMetrics).as_deref(), Some("95"));

        fields.retain_selected(&[PosterField::HeroHeadline]);
        assert!(fields.get(PosterField::SuccessMetrics).is_none());
    }

    #[test]
    fn test_text_to_image_defaults() {
        let body: TextToImageRequest =
            serde_json::from_str(r#"{"main_prompt": "a red fox"}"#).unwrap();
        let request: GenerationRequest = body.into();
        assert_eq!(request.aspect_ratio(), AspectRatio::Square);
        assert_eq!(request.count(), 1);
        assert!(request.constraints().is_empty());
    }
}
