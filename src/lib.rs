pub mod clients;
pub mod config;
pub mod copywriter;
pub mod engine;
pub mod error;
pub mod logger;
pub mod materializer;
pub mod models;
pub mod planner;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;

#[cfg(test)]
mod testing;

pub use clients::{ChatClient, ExternalClients, HttpFetcher, ImageClient, TextClient};
pub use config::{BedrockConfig, Config, ImageApiConfig, ReasoningConfig, ReasoningKind};
pub use engine::{SizeTable, TieredExecutor};
pub use error::{PosterError, Result};
pub use materializer::Materializer;
pub use models::{
    AspectRatio, ContentCategory, GenerationOutcome, GenerationPlan, GenerationRequest,
    ImageArtifact, ImagesResponse, PosterFields, PosterRequest,
};
pub use planner::{Planner, PreferenceTable};
pub use registry::{default_registry, ProviderProfile, ProviderRegistry};
pub use studio::PosterStudio;
