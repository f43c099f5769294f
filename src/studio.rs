use crate::{
    clients::ExternalClients,
    config::Config,
    copywriter::{build_image_prompt, Copywriter},
    engine::TieredExecutor,
    error::Result,
    logger::{self, Timer},
    materializer::Materializer,
    models::{
        AspectRatio, ContentCategory, GenerationOutcome, GenerationPlan, GenerationRequest,
        PosterFields, PosterImageRequest, PosterRequest,
    },
    planner::Planner,
    registry::{default_registry, ProviderRegistry},
};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for every generation flow: text-to-image, poster copy and
/// poster images.
pub struct PosterStudio {
    planner: Planner,
    executor: TieredExecutor,
    materializer: Materializer,
    copywriter: Copywriter,
}

impl PosterStudio {
    pub fn new(registry: Arc<ProviderRegistry>, clients: ExternalClients, config: &Config) -> Self {
        Self {
            planner: Planner::new(registry.clone(), clients.reasoning.clone()),
            executor: TieredExecutor::new(registry, clients.images)
                .with_tier_delay(Duration::from_millis(config.tier_delay_ms)),
            materializer: Materializer::new(clients.fetcher),
            copywriter: Copywriter::new(clients.reasoning).with_sampling(
                config.reasoning.max_tokens,
                config.reasoning.temperature,
            ),
        }
    }

    /// Builds the real HTTP/Bedrock clients and uses the built-in registry.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let clients = ExternalClients::from_config(config).await?;
        Ok(Self::new(default_registry(), clients, config))
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.planner.registry()
    }

    pub async fn generate_images(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        logger::in_request(request.id(), async {
            let _timer = Timer::new("generate_images");
            log::info!(
                "🖼️  Generating {} image(s) at {}",
                request.count(),
                request.aspect_ratio()
            );

            let plan = self.planner.plan(request).await?;
            self.run(request.id(), &plan, request.count()).await
        })
        .await
    }

    pub async fn generate_fields(&self, request: &PosterRequest) -> Result<PosterFields> {
        let _timer = Timer::new("generate_fields");
        self.copywriter.generate_fields(request).await
    }

    /// Renders one square poster from finished copy.
    pub async fn generate_poster(&self, request: &PosterImageRequest) -> Result<GenerationOutcome> {
        // The theme is already part of the prompt as its background section.
        let prompt = build_image_prompt(&request.fields, request.theme.as_deref());
        let generation = GenerationRequest::new(prompt, AspectRatio::Square, 1);

        logger::in_request(generation.id(), async {
            let _timer = Timer::new("generate_poster");
            let plan = self
                .planner
                .plan_for_category(&generation, ContentCategory::TextDesign)?;
            self.run(generation.id(), &plan, 1).await
        })
        .await
    }

    async fn run(
        &self,
        request_id: &str,
        plan: &GenerationPlan,
        count: u32,
    ) -> Result<GenerationOutcome> {
        let success = self.executor.execute(plan, count).await?;
        let images = self.materializer.materialize_all(&success.references).await?;

        log::info!(
            "🎉 Delivered {} image(s) from {} (tier {})",
            images.len(),
            success.provider,
            success.tier
        );

        Ok(GenerationOutcome {
            request_id: request_id.to_string(),
            provider_used: success.provider,
            category: plan.category,
            plan_source: plan.source.clone(),
            images,
        })
    }
}
