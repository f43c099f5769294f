//! In-memory doubles for the external collaborators.

use crate::{
    clients::{ImageBackend, ImageFetcher, ReasoningBackend},
    error::{PosterError, Result},
    models::{AspectRatio, ImageCall, PromptStyle, ReasoningRequest},
    registry::{ProviderProfile, ProviderRegistry},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

pub const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Four providers: A and B only take square/standard ratios, C and D take all.
pub fn abcd_registry() -> ProviderRegistry {
    let narrow = [
        AspectRatio::Square,
        AspectRatio::Standard,
        AspectRatio::StandardPortrait,
    ];
    ProviderRegistry::new(vec![
        ProviderProfile::new("A", "vendor/a")
            .with_token_budget(40)
            .with_aspect_ratios(&narrow)
            .with_style(PromptStyle::Photographic),
        ProviderProfile::new("B", "vendor/b")
            .with_token_budget(40)
            .with_aspect_ratios(&narrow)
            .with_style(PromptStyle::Photographic),
        ProviderProfile::new("C", "vendor/c")
            .with_token_budget(200)
            .with_style(PromptStyle::Typographic),
        ProviderProfile::new("D", "vendor/d")
            .with_token_budget(200)
            .with_default_size(2048, 2048)
            .with_style(PromptStyle::Environmental),
    ])
}

/// Image backend that fails for the listed model ids and succeeds otherwise.
#[derive(Default)]
pub struct ScriptedImageBackend {
    failing: HashSet<String>,
    surplus: u32,
    calls: Mutex<Vec<ImageCall>>,
}

impl ScriptedImageBackend {
    pub fn failing(models: &[&str]) -> Self {
        Self {
            failing: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Returns `surplus` more references than the call asked for.
    pub fn with_surplus(mut self, surplus: u32) -> Self {
        self.surplus = surplus;
        self
    }

    pub fn calls(&self) -> Vec<ImageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }
}

#[async_trait]
impl ImageBackend for ScriptedImageBackend {
    async fn generate(&self, call: &ImageCall) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(call.clone());
        if self.failing.contains(&call.model) {
            return Err(PosterError::Api {
                status: 503,
                message: format!("{} is overloaded", call.model),
            });
        }
        Ok((0..call.n + self.surplus)
            .map(|i| format!("mem://{}/{}", call.model, i))
            .collect())
    }
}

/// Reasoning backend returning a canned reply (or failing when none is set).
pub struct ScriptedReasoner {
    reply: Option<String>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl ScriptedReasoner {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedReasoner {
    async fn complete(&self, request: &ReasoningRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| PosterError::Request("reasoning service unreachable".into()))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Serves a PNG-looking payload derived from the reference itself.
#[derive(Default)]
pub struct MemoryFetcher {
    missing: HashSet<String>,
}

impl MemoryFetcher {
    pub fn missing(references: &[&str]) -> Self {
        Self {
            missing: references.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn payload_for(reference: &str) -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(reference.as_bytes());
        bytes
    }
}

#[async_trait]
impl ImageFetcher for MemoryFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        if self.missing.contains(reference) {
            return Err(PosterError::Api {
                status: 404,
                message: "expired".into(),
            });
        }
        Ok(Self::payload_for(reference))
    }
}
