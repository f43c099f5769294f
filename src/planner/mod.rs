//! Turns a generation request into a ranked, capability-checked plan.
//!
//! The reasoning model only decides the content category and may contribute
//! prompts. Provider order always comes from the preference table, filtered by
//! aspect-ratio support before it is cut down to [`MAX_PLAN_CANDIDATES`].

pub mod prompts;

use crate::{
    clients::ReasoningBackend,
    error::{PosterError, Result},
    models::{
        AspectRatio, Candidate, ContentCategory, GenerationPlan, GenerationRequest, PlanSource,
        ReasoningRequest, MAX_PLAN_CANDIDATES,
    },
    registry::{ProviderProfile, ProviderRegistry},
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Category → ordered provider preference.
#[derive(Debug, Clone)]
pub struct PreferenceTable {
    rows: HashMap<ContentCategory, Vec<String>>,
}

impl Default for PreferenceTable {
    fn default() -> Self {
        Self::new()
            .with_row(ContentCategory::People, &["imagen-4", "imagen-3", "qwen-image"])
            .with_row(
                ContentCategory::TextDesign,
                &["qwen-image", "imagen-4", "flux-schnell-v2"],
            )
            .with_row(
                ContentCategory::Nature,
                &["qwen-image", "sana-1.5", "flux-schnell-v2"],
            )
            .with_row(
                ContentCategory::Artistic,
                &["flux-schnell-v2", "qwen-image", "imagen-3"],
            )
            .with_row(
                ContentCategory::Realistic,
                &["imagen-3", "imagen-4", "qwen-image"],
            )
    }
}

impl PreferenceTable {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }

    pub fn with_row(mut self, category: ContentCategory, providers: &[&str]) -> Self {
        self.rows
            .insert(category, providers.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn providers_for(&self, category: ContentCategory) -> &[String] {
        self.rows.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A provider suggestion as written back by the reasoning model.
#[derive(Debug, Clone, Deserialize)]
pub struct Suggestion {
    #[serde(alias = "name")]
    pub provider: String,
    #[serde(default, alias = "enhanced_prompt")]
    pub prompt: String,
    #[serde(default, alias = "reasoning")]
    pub rationale: String,
}

#[derive(Deserialize)]
struct ReasonedPlan {
    intent: String,
    #[serde(default)]
    candidates: Vec<Suggestion>,
    primary_model: Option<Suggestion>,
    secondary_model: Option<Suggestion>,
    tertiary_model: Option<Suggestion>,
}

/// Result of the semantic step. A failure always carries a usable default.
#[derive(Debug, Clone)]
pub enum Classification {
    Classified {
        category: ContentCategory,
        suggestions: Vec<Suggestion>,
    },
    Fallback {
        reason: String,
    },
}

impl Classification {
    pub fn parse(raw: &str) -> Self {
        let body = prompts::strip_code_fences(raw);
        let parsed: ReasonedPlan = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Classification::Fallback {
                    reason: format!("unparseable classification: {}", e),
                }
            }
        };

        let Some(category) = ContentCategory::from_intent(&parsed.intent) else {
            return Classification::Fallback {
                reason: format!("unrecognised intent '{}'", parsed.intent),
            };
        };

        let mut suggestions = parsed.candidates;
        suggestions.extend(
            [parsed.primary_model, parsed.secondary_model, parsed.tertiary_model]
                .into_iter()
                .flatten(),
        );

        Classification::Classified {
            category,
            suggestions,
        }
    }
}

pub struct Planner {
    registry: Arc<ProviderRegistry>,
    reasoner: Arc<dyn ReasoningBackend>,
    preferences: PreferenceTable,
}

impl Planner {
    pub fn new(registry: Arc<ProviderRegistry>, reasoner: Arc<dyn ReasoningBackend>) -> Self {
        Self {
            registry,
            reasoner,
            preferences: PreferenceTable::default(),
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceTable) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Classifies the request, then builds the plan. Never returns an empty plan.
    pub async fn plan(&self, request: &GenerationRequest) -> Result<GenerationPlan> {
        self.ensure_compatible(request.aspect_ratio())?;

        let (category, suggestions, source) = match self.classify(request).await {
            Classification::Classified {
                category,
                suggestions,
            } => (Some(category), suggestions, PlanSource::Classified),
            Classification::Fallback { reason } => {
                log::warn!(
                    "⚠️  Classification fallback used for request {}: {}",
                    request.id(),
                    reason
                );
                (None, Vec::new(), PlanSource::Fallback { reason })
            }
        };

        Ok(self.assemble(request, category, &suggestions, source))
    }

    /// Builds a plan for a known category without calling the reasoning model.
    pub fn plan_for_category(
        &self,
        request: &GenerationRequest,
        category: ContentCategory,
    ) -> Result<GenerationPlan> {
        self.ensure_compatible(request.aspect_ratio())?;
        Ok(self.assemble(request, Some(category), &[], PlanSource::Preset))
    }

    pub async fn classify(&self, request: &GenerationRequest) -> Classification {
        let reasoning = ReasoningRequest::new(prompts::classification_prompt(
            request,
            &self.registry,
        ))
        .with_temperature(0.7);

        match self.reasoner.complete(&reasoning).await {
            Ok(raw) => {
                log::debug!("Classification reply for {}: {}", request.id(), raw);
                Classification::parse(&raw)
            }
            Err(e) => Classification::Fallback {
                reason: format!("reasoning call failed: {}", e),
            },
        }
    }

    fn ensure_compatible(&self, ratio: AspectRatio) -> Result<()> {
        if self.registry.compatible(ratio).is_empty() {
            log::error!("❌ No provider supports aspect ratio {}", ratio);
            return Err(PosterError::NoCompatibleProvider {
                aspect_ratio: ratio,
            });
        }
        Ok(())
    }

    fn assemble(
        &self,
        request: &GenerationRequest,
        category: Option<ContentCategory>,
        suggestions: &[Suggestion],
        source: PlanSource,
    ) -> GenerationPlan {
        let profiles = self.ranked_providers(category, request.aspect_ratio());

        let candidates = profiles
            .iter()
            .enumerate()
            .map(|(i, profile)| {
                let suggestion = suggestions
                    .iter()
                    .find(|s| s.provider == profile.name && !s.prompt.trim().is_empty());

                let prompt = match suggestion {
                    Some(s) => s.prompt.clone(),
                    None => prompts::synthesize(profile, request),
                };
                let rationale = suggestion
                    .map(|s| s.rationale.trim())
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .unwrap_or_else(|| prompts::default_rationale(i + 1, category, profile));

                Candidate::new(
                    profile.name.clone(),
                    prompts::fit_to_budget(&prompt, profile.max_prompt_tokens),
                    rationale,
                )
            })
            .collect();

        let plan = GenerationPlan {
            aspect_ratio: request.aspect_ratio(),
            category,
            source,
            candidates,
        };

        log::info!(
            "🧭 Plan for request {} ({}, {}): {:?}",
            request.id(),
            category.map(|c| c.as_str()).unwrap_or("unclassified"),
            plan.aspect_ratio,
            plan.providers()
        );
        plan
    }

    /// Preference order for `category`, filtered by ratio support and then truncated.
    fn ranked_providers(
        &self,
        category: Option<ContentCategory>,
        ratio: AspectRatio,
    ) -> Vec<&ProviderProfile> {
        let compatible = self.registry.compatible(ratio);

        let mut seen = HashSet::new();
        let mut ranked: Vec<&ProviderProfile> = match category {
            Some(category) => self
                .preferences
                .providers_for(category)
                .iter()
                .filter_map(|name| self.registry.lookup(name))
                .filter(|profile| profile.supports(ratio))
                .filter(|profile| seen.insert(profile.name.clone()))
                .collect(),
            None => compatible.clone(),
        };

        if ranked.is_empty() {
            ranked = compatible;
        }
        ranked.truncate(MAX_PLAN_CANDIDATES);
        ranked
    }
}
