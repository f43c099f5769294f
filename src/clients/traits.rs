use crate::{
    error::Result,
    models::{ImageCall, ReasoningRequest},
};
use async_trait::async_trait;

/// An image generation endpoint. Returns fetchable image references.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, call: &ImageCall) -> Result<Vec<String>>;
}

/// The language model used for classification and poster copy.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    async fn complete(&self, request: &ReasoningRequest) -> Result<String>;

    fn model_id(&self) -> &str;
}

/// Retrieves the bytes behind a provider-returned reference.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}
