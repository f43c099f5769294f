use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ContentCategory, ImageArtifact, PlanSource};
use crate::error::PosterError;

/// Why a single tier did not produce images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    UnknownProvider,
    UnsupportedAspectRatio,
    Transport,
    Api,
    MalformedResponse,
}

impl AttemptKind {
    pub fn from_error(error: &PosterError) -> Self {
        match error {
            PosterError::Api { .. } => AttemptKind::Api,
            PosterError::Response(_) | PosterError::Serialization(_) => {
                AttemptKind::MalformedResponse
            }
            _ => AttemptKind::Transport,
        }
    }
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttemptKind::UnknownProvider => "unknown provider",
            AttemptKind::UnsupportedAspectRatio => "unsupported aspect ratio",
            AttemptKind::Transport => "transport error",
            AttemptKind::Api => "provider error",
            AttemptKind::MalformedResponse => "malformed response",
        };
        f.write_str(label)
    }
}

/// One entry of the attempt history, for operators only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub tier: usize,
    pub provider: String,
    pub kind: AttemptKind,
    pub message: String,
}

/// The winning tier's raw result, before materialization.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSuccess {
    pub provider: String,
    pub model_id: String,
    pub tier: usize,
    pub references: Vec<String>,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub request_id: String,
    pub provider_used: String,
    pub category: Option<ContentCategory>,
    pub plan_source: PlanSource,
    pub images: Vec<ImageArtifact>,
}

/// JSON body returned by the image endpoints.
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_used: Option<String>,
    pub message: String,
}

impl ImagesResponse {
    pub fn success(outcome: GenerationOutcome) -> Self {
        let count = outcome.images.len();
        Self {
            status: "success",
            images: outcome.images.into_iter().map(|image| image.data).collect(),
            provider_used: Some(outcome.provider_used),
            message: format!("{} images generated successfully.", count),
        }
    }

    pub fn failure(error: &PosterError) -> Self {
        Self {
            status: "failure",
            images: Vec::new(),
            provider_used: None,
            message: error.public_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_kind_from_error() {
        let api = PosterError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(AttemptKind::from_error(&api), AttemptKind::Api);
        assert_eq!(
            AttemptKind::from_error(&PosterError::Response("no data".into())),
            AttemptKind::MalformedResponse
        );
        assert_eq!(
            AttemptKind::from_error(&PosterError::Request("timeout".into())),
            AttemptKind::Transport
        );
    }

    #[test]
    fn test_failure_response_is_generic() {
        let err = PosterError::AllProvidersExhausted {
            attempts: vec![AttemptRecord {
                tier: 1,
                provider: "sana-1.5".into(),
                kind: AttemptKind::Transport,
                message: "connection reset".into(),
            }],
        };
        let body = serde_json::to_value(ImagesResponse::failure(&err)).unwrap();
        assert_eq!(body["status"], "failure");
        assert!(body.get("images").is_none());
        assert!(!body.to_string().contains("sana"));
    }
}
