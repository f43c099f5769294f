//! Static table of the image providers the planner and engine may use.
//!
//! Routing is driven entirely by this data: aspect-ratio support, token budget,
//! image limit and prompt style. Adding a provider means adding a profile here
//! and, if it should win some category, a row in the planner's preference table.

use crate::models::{AspectRatio, PromptStyle};
use once_cell::sync::Lazy;
use std::fmt::Write as _;
use std::sync::Arc;

static DEFAULT_REGISTRY: Lazy<Arc<ProviderRegistry>> =
    Lazy::new(|| Arc::new(ProviderRegistry::builtin()));

/// Shared handle on the process-wide provider table.
pub fn default_registry() -> Arc<ProviderRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub name: String,
    pub model_id: String,
    pub max_prompt_tokens: usize,
    pub default_size: (u32, u32),
    pub aspect_ratios: Vec<AspectRatio>,
    pub max_images: u32,
    pub style: PromptStyle,
    pub strengths: String,
}

impl ProviderProfile {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_id: model_id.into(),
            max_prompt_tokens: 800,
            default_size: (1024, 1024),
            aspect_ratios: AspectRatio::ALL.to_vec(),
            max_images: 3,
            style: PromptStyle::Artistic,
            strengths: String::new(),
        }
    }

    pub fn with_token_budget(mut self, max_prompt_tokens: usize) -> Self {
        self.max_prompt_tokens = max_prompt_tokens;
        self
    }

    pub fn with_default_size(mut self, width: u32, height: u32) -> Self {
        self.default_size = (width, height);
        self
    }

    pub fn with_aspect_ratios(mut self, ratios: &[AspectRatio]) -> Self {
        self.aspect_ratios = ratios.to_vec();
        self
    }

    pub fn with_max_images(mut self, max_images: u32) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_strengths(mut self, strengths: impl Into<String>) -> Self {
        self.strengths = strengths.into();
        self
    }

    pub fn supports(&self, ratio: AspectRatio) -> bool {
        self.aspect_ratios.contains(&ratio)
    }

    pub fn default_size_string(&self) -> String {
        format!("{}x{}", self.default_size.0, self.default_size.1)
    }
}

/// Read-only provider table. Order is the deterministic fallback order.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    profiles: Vec<ProviderProfile>,
}

impl ProviderRegistry {
    pub fn new(profiles: Vec<ProviderProfile>) -> Self {
        Self { profiles }
    }

    pub fn builtin() -> Self {
        let square_and_standard = [
            AspectRatio::Square,
            AspectRatio::Standard,
            AspectRatio::StandardPortrait,
        ];

        Self::new(vec![
            ProviderProfile::new("imagen-4", "provider-4/imagen-4")
                .with_token_budget(420)
                .with_aspect_ratios(&square_and_standard)
                .with_style(PromptStyle::Photographic)
                .with_strengths("people, portraits, animals, professional photography"),
            ProviderProfile::new("imagen-3", "provider-4/imagen-3")
                .with_token_budget(420)
                .with_aspect_ratios(&square_and_standard)
                .with_style(PromptStyle::Photographic)
                .with_strengths("general realistic scenes, architecture, products"),
            ProviderProfile::new("qwen-image", "provider-5/qwen-image")
                .with_token_budget(1800)
                .with_style(PromptStyle::Typographic)
                .with_strengths("text-heavy posters, marketing layouts, multilingual text"),
            ProviderProfile::new("flux-schnell-v2", "provider-7/flux-schnell-v2")
                .with_token_budget(800)
                .with_style(PromptStyle::Artistic)
                .with_strengths("fast stylized art and creative concepts"),
            ProviderProfile::new("sana-1.5", "provider-6/sana-1.5")
                .with_token_budget(1800)
                .with_default_size(4096, 4096)
                .with_style(PromptStyle::Environmental)
                .with_strengths("nature, landscapes, abstract scenes; poor at people"),
        ])
    }

    pub fn lookup(&self, name: &str) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn supports(&self, name: &str, ratio: AspectRatio) -> bool {
        self.lookup(name).map_or(false, |p| p.supports(ratio))
    }

    /// Profiles that accept `ratio`, in registry order.
    pub fn compatible(&self, ratio: AspectRatio) -> Vec<&ProviderProfile> {
        self.profiles.iter().filter(|p| p.supports(ratio)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Capability catalogue handed to the reasoning model.
    pub fn catalogue(&self) -> String {
        let mut out = String::new();
        for (i, p) in self.profiles.iter().enumerate() {
            let ratios: Vec<&str> = p.aspect_ratios.iter().map(|r| r.as_str()).collect();
            let _ = writeln!(
                out,
                "{}. {} ({} tokens max): {}. Supports: {}",
                i + 1,
                p.name,
                p.max_prompt_tokens,
                p.strengths,
                ratios.join(", ")
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = ProviderRegistry::builtin();
        let qwen = registry.lookup("qwen-image").unwrap();
        assert_eq!(qwen.model_id, "provider-5/qwen-image");
        assert_eq!(qwen.max_prompt_tokens, 1800);
        assert!(registry.lookup("dall-e-9").is_none());
        assert_eq!(
            registry.lookup("sana-1.5").unwrap().default_size_string(),
            "4096x4096"
        );
    }

    #[test]
    fn test_imagen_excludes_wide_ratios() {
        let registry = ProviderRegistry::builtin();
        for ratio in [AspectRatio::Landscape, AspectRatio::Portrait] {
            assert!(!registry.supports("imagen-4", ratio));
            assert!(!registry.supports("imagen-3", ratio));
            let names: Vec<&str> = registry
                .compatible(ratio)
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            assert_eq!(names, vec!["qwen-image", "flux-schnell-v2", "sana-1.5"]);
        }
    }

    #[test]
    fn test_every_ratio_has_a_provider() {
        let registry = default_registry();
        for ratio in AspectRatio::ALL {
            assert!(!registry.compatible(ratio).is_empty(), "{}", ratio);
        }
    }

    #[test]
    fn test_catalogue_lists_all_providers() {
        let registry = ProviderRegistry::builtin();
        let catalogue = registry.catalogue();
        for profile in registry.iter() {
            assert!(catalogue.contains(&profile.name));
        }
        assert!(catalogue.contains("1:1, 4:3, 3:4"));
    }
}
