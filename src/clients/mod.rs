pub mod chat_client;
pub mod image_client;
pub mod text_client;
pub mod traits;

use crate::{
    config::{Config, ReasoningKind},
    error::Result,
};
use std::sync::Arc;
use std::time::Duration;

pub use chat_client::ChatClient;
pub use image_client::{HttpFetcher, ImageClient};
pub use text_client::TextClient;
pub use traits::{ImageBackend, ImageFetcher, ReasoningBackend};

/// The external collaborators a studio needs, built from configuration.
#[derive(Clone)]
pub struct ExternalClients {
    pub images: Arc<dyn ImageBackend>,
    pub reasoning: Arc<dyn ReasoningBackend>,
    pub fetcher: Arc<dyn ImageFetcher>,
}

impl ExternalClients {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let reasoning: Arc<dyn ReasoningBackend> = match config.reasoning.kind {
            ReasoningKind::Chat => Arc::new(ChatClient::new(&config.reasoning, timeout)?),
            ReasoningKind::Bedrock => {
                let bedrock = config.bedrock.clone().unwrap_or_default();
                Arc::new(TextClient::connect(&bedrock, config.reasoning.model_id.clone()).await?)
            }
        };

        log::info!(
            "Reasoning backend: {:?} ({})",
            config.reasoning.kind,
            reasoning.model_id()
        );

        Ok(Self {
            images: Arc::new(ImageClient::new(&config.image_api, timeout)?),
            reasoning,
            fetcher: Arc::new(HttpFetcher::new(timeout)?),
        })
    }
}
