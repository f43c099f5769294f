//! Walks a plan tier by tier until one provider returns images.

use crate::{
    clients::ImageBackend,
    error::{PosterError, Result},
    models::{
        AspectRatio, AttemptKind, AttemptRecord, GenerationPlan, GenerationSuccess, ImageCall,
        MAX_IMAGES_PER_REQUEST,
    },
    registry::{ProviderProfile, ProviderRegistry},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Aspect ratio → output pixel size sent to providers.
#[derive(Debug, Clone)]
pub struct SizeTable {
    sizes: HashMap<AspectRatio, (u32, u32)>,
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::new()
            .with_size(AspectRatio::Square, 1024, 1024)
            .with_size(AspectRatio::Landscape, 1280, 720)
            .with_size(AspectRatio::Portrait, 720, 1280)
            .with_size(AspectRatio::Standard, 1024, 768)
            .with_size(AspectRatio::StandardPortrait, 768, 1024)
            .with_size(AspectRatio::Photo, 1024, 683)
            .with_size(AspectRatio::PhotoPortrait, 683, 1024)
    }
}

impl SizeTable {
    pub fn new() -> Self {
        Self {
            sizes: HashMap::new(),
        }
    }

    pub fn with_size(mut self, ratio: AspectRatio, width: u32, height: u32) -> Self {
        self.sizes.insert(ratio, (width, height));
        self
    }

    /// "WIDTHxHEIGHT" for `ratio`, or the provider's default size when unmapped.
    pub fn resolve(&self, ratio: AspectRatio, profile: &ProviderProfile) -> String {
        match self.sizes.get(&ratio) {
            Some((width, height)) => format!("{}x{}", width, height),
            None => profile.default_size_string(),
        }
    }
}

pub struct TieredExecutor {
    registry: Arc<ProviderRegistry>,
    backend: Arc<dyn ImageBackend>,
    sizes: SizeTable,
    tier_delay: Duration,
}

impl TieredExecutor {
    pub fn new(registry: Arc<ProviderRegistry>, backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            registry,
            backend,
            sizes: SizeTable::default(),
            tier_delay: Duration::ZERO,
        }
    }

    pub fn with_sizes(mut self, sizes: SizeTable) -> Self {
        self.sizes = sizes;
        self
    }

    /// Pause inserted between two consecutive provider calls.
    pub fn with_tier_delay(mut self, delay: Duration) -> Self {
        self.tier_delay = delay;
        self
    }

    /// Tries each candidate exactly once, in plan order, and stops at the first success.
    pub async fn execute(&self, plan: &GenerationPlan, image_count: u32) -> Result<GenerationSuccess> {
        let requested = image_count.clamp(1, MAX_IMAGES_PER_REQUEST);
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(plan.len());
        let mut called_before = false;

        for (index, candidate) in plan.candidates.iter().enumerate() {
            let tier = index + 1;
            let mut record = |kind: AttemptKind, message: String| {
                log::warn!(
                    "⚠️  Tier {} ({}) failed: {} - {}",
                    tier,
                    candidate.provider,
                    kind,
                    message
                );
                attempts.push(AttemptRecord {
                    tier,
                    provider: candidate.provider.clone(),
                    kind,
                    message,
                });
            };

            // Plans can be built by hand, so the planner's guarantees are re-checked.
            let Some(profile) = self.registry.lookup(&candidate.provider) else {
                record(AttemptKind::UnknownProvider, "not in registry".into());
                continue;
            };
            if !profile.supports(plan.aspect_ratio) {
                record(
                    AttemptKind::UnsupportedAspectRatio,
                    format!("{} not supported", plan.aspect_ratio),
                );
                continue;
            }

            if called_before && !self.tier_delay.is_zero() {
                tokio::time::sleep(self.tier_delay).await;
            }
            called_before = true;

            let call = ImageCall {
                model: profile.model_id.clone(),
                prompt: candidate.prompt.clone(),
                n: requested.min(profile.max_images.max(1)),
                size: self.sizes.resolve(plan.aspect_ratio, profile),
            };

            log::info!(
                "🧪 Trying tier {} ({}) with n={} size={}",
                tier,
                profile.name,
                call.n,
                call.size
            );

            match self.backend.generate(&call).await {
                Ok(mut references) if !references.is_empty() => {
                    if references.len() > call.n as usize {
                        log::warn!(
                            "⚠️  Tier {} ({}) returned {} image(s) for n={}, keeping {}",
                            tier,
                            profile.name,
                            references.len(),
                            call.n,
                            call.n
                        );
                        references.truncate(call.n as usize);
                    }
                    log::info!(
                        "✅ Tier {} ({}) returned {} image(s)",
                        tier,
                        profile.name,
                        references.len()
                    );
                    return Ok(GenerationSuccess {
                        provider: profile.name.clone(),
                        model_id: profile.model_id.clone(),
                        tier,
                        references,
                        attempts,
                    });
                }
                Ok(_) => record(
                    AttemptKind::MalformedResponse,
                    "provider returned no images".into(),
                ),
                Err(e) => record(AttemptKind::from_error(&e), e.to_string()),
            }
        }

        log::error!(
            "❌ All {} provider tier(s) failed: {:?}",
            attempts.len(),
            attempts
                .iter()
                .map(|a| format!("{}={}", a.provider, a.kind))
                .collect::<Vec<_>>()
        );
        Err(PosterError::AllProvidersExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;
    use crate::testing::{abcd_registry, ScriptedImageBackend};

    fn plan(ratio: AspectRatio, providers: &[&str]) -> GenerationPlan {
        GenerationPlan::new(
            ratio,
            providers
                .iter()
                .map(|p| Candidate::new(*p, format!("prompt for {}", p), "test"))
                .collect(),
        )
    }

    fn executor(backend: Arc<ScriptedImageBackend>) -> TieredExecutor {
        TieredExecutor::new(Arc::new(abcd_registry()), backend)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let backend = Arc::new(ScriptedImageBackend::failing(&["vendor/a", "vendor/b"]));
        let result = executor(backend.clone())
            .execute(&plan(AspectRatio::Square, &["A", "B", "C", "D"]), 1)
            .await
            .unwrap();

        assert_eq!(result.provider, "C");
        assert_eq!(result.tier, 3);
        assert_eq!(result.attempts.len(), 2);
        assert_eq!(
            backend.called_models(),
            vec!["vendor/a", "vendor/b", "vendor/c"]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_records_every_tier_in_order() {
        let backend = Arc::new(ScriptedImageBackend::failing(&[
            "vendor/a", "vendor/b", "vendor/c",
        ]));
        let err = executor(backend.clone())
            .execute(&plan(AspectRatio::Square, &["A", "B", "C"]), 2)
            .await
            .unwrap_err();

        let attempts = err.attempts().unwrap();
        assert_eq!(attempts.len(), 3);
        let order: Vec<&str> = attempts.iter().map(|a| a.provider.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert!(attempts.iter().all(|a| a.kind == AttemptKind::Api));
        assert_eq!(attempts[2].tier, 3);
        // one attempt per candidate, no retries
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_count_is_capped_at_three() {
        let backend = Arc::new(ScriptedImageBackend::default());
        let result = executor(backend.clone())
            .execute(&plan(AspectRatio::Square, &["C"]), 10)
            .await
            .unwrap();

        assert_eq!(backend.calls()[0].n, 3);
        assert_eq!(result.references.len(), 3);
    }

    #[tokio::test]
    async fn test_surplus_references_are_dropped() {
        let backend = Arc::new(ScriptedImageBackend::default().with_surplus(4));
        let result = executor(backend.clone())
            .execute(&plan(AspectRatio::Square, &["C"]), 2)
            .await
            .unwrap();

        assert_eq!(backend.calls()[0].n, 2);
        assert_eq!(
            result.references,
            vec!["mem://vendor/c/0", "mem://vendor/c/1"]
        );
    }

    #[tokio::test]
    async fn test_count_respects_provider_limit() {
        let registry = ProviderRegistry::new(vec![
            ProviderProfile::new("solo", "vendor/solo").with_max_images(1)
        ]);
        let backend = Arc::new(ScriptedImageBackend::default());
        TieredExecutor::new(Arc::new(registry), backend.clone())
            .execute(&plan(AspectRatio::Square, &["solo"]), 3)
            .await
            .unwrap();
        assert_eq!(backend.calls()[0].n, 1);
    }

    #[tokio::test]
    async fn test_hand_built_plan_is_revalidated() {
        let backend = Arc::new(ScriptedImageBackend::default());
        let result = executor(backend.clone())
            .execute(&plan(AspectRatio::Landscape, &["A", "ghost", "D"]), 1)
            .await
            .unwrap();

        assert_eq!(result.provider, "D");
        assert_eq!(result.attempts[0].kind, AttemptKind::UnsupportedAspectRatio);
        assert_eq!(result.attempts[1].kind, AttemptKind::UnknownProvider);
        assert_eq!(backend.called_models(), vec!["vendor/d"]);
    }

    #[tokio::test]
    async fn test_skipped_tiers_count_toward_exhaustion() {
        let backend = Arc::new(ScriptedImageBackend::failing(&["vendor/c"]));
        let err = executor(backend)
            .execute(&plan(AspectRatio::Portrait, &["A", "C"]), 1)
            .await
            .unwrap_err();
        let kinds: Vec<AttemptKind> = err.attempts().unwrap().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AttemptKind::UnsupportedAspectRatio, AttemptKind::Api]
        );
    }

    #[tokio::test]
    async fn test_size_resolution() {
        let backend = Arc::new(ScriptedImageBackend::default());
        executor(backend.clone())
            .execute(&plan(AspectRatio::Portrait, &["C"]), 1)
            .await
            .unwrap();
        assert_eq!(backend.calls()[0].size, "720x1280");

        let backend = Arc::new(ScriptedImageBackend::default());
        executor(backend.clone())
            .with_sizes(SizeTable::new())
            .execute(&plan(AspectRatio::Portrait, &["D"]), 1)
            .await
            .unwrap();
        assert_eq!(backend.calls()[0].size, "2048x2048");
    }

    #[tokio::test]
    async fn test_tier_delay_between_calls() {
        let backend = Arc::new(ScriptedImageBackend::failing(&["vendor/c"]));
        let started = std::time::Instant::now();
        executor(backend)
            .with_tier_delay(Duration::from_millis(50))
            .execute(&plan(AspectRatio::Square, &["C", "D"]), 1)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
