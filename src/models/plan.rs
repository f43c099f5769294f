use serde::{Deserialize, Serialize};

use super::{AspectRatio, ContentCategory};

/// Hard cap on tiers per plan.
pub const MAX_PLAN_CANDIDATES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub provider: String,
    pub prompt: String,
    pub rationale: String, // diagnostics only
}

impl Candidate {
    pub fn new(
        provider: impl Into<String>,
        prompt: impl Into<String>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            prompt: prompt.into(),
            rationale: rationale.into(),
        }
    }
}

/// How the plan's provider order was decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    Classified,
    /// Preset category, no reasoning call.
    Preset,
    /// Reasoning step failed; order comes from the registry alone.
    Fallback { reason: String },
}

impl PlanSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, PlanSource::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPlan {
    pub aspect_ratio: AspectRatio,
    pub category: Option<ContentCategory>,
    pub source: PlanSource,
    pub candidates: Vec<Candidate>,
}

impl GenerationPlan {
    pub fn new(aspect_ratio: AspectRatio, candidates: Vec<Candidate>) -> Self {
        Self {
            aspect_ratio,
            category: None,
            source: PlanSource::Preset,
            candidates,
        }
    }

    pub fn providers(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.provider.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
