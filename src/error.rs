use crate::models::{AspectRatio, AttemptRecord};

/// Message shown to callers when no provider tier produced an image.
pub const BUSY_MESSAGE: &str = "Our models are busy right now, try again later.";

#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Response error: {0}")]
    Response(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("AWS error: {0}")]
    Aws(String),

    #[error("no registered provider supports aspect ratio {aspect_ratio}")]
    NoCompatibleProvider { aspect_ratio: AspectRatio },

    #[error("all {} provider tiers failed", attempts.len())]
    AllProvidersExhausted { attempts: Vec<AttemptRecord> },

    #[error("failed to fetch generated image {reference}: {message}")]
    Fetch { reference: String, message: String },
}

impl PosterError {
    /// Caller-facing text. Never names a provider or echoes provider output.
    pub fn public_message(&self) -> &'static str {
        match self {
            PosterError::NoCompatibleProvider { .. } => {
                "The requested aspect ratio is not supported right now."
            }
            PosterError::AllProvidersExhausted { .. } => BUSY_MESSAGE,
            PosterError::Fetch { .. } => {
                "Your image was generated but could not be delivered, try again later."
            }
            PosterError::Request(_) => "The request could not be processed.",
            _ => "Something went wrong on our side, try again later.",
        }
    }

    /// Attempt history for operator diagnostics, if this is an exhaustion error.
    pub fn attempts(&self) -> Option<&[AttemptRecord]> {
        match self {
            PosterError::AllProvidersExhausted { attempts } => Some(attempts),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PosterError {
    fn from(e: reqwest::Error) -> Self {
        PosterError::Request(e.to_string())
    }
}

impl From<serde_json::Error> for PosterError {
    fn from(e: serde_json::Error) -> Self {
        PosterError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PosterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttemptKind;

    #[test]
    fn test_public_message_hides_providers() {
        let err = PosterError::AllProvidersExhausted {
            attempts: vec![AttemptRecord {
                tier: 1,
                provider: "imagen-4".into(),
                kind: AttemptKind::Api,
                message: "quota exceeded for provider-4".into(),
            }],
        };
        assert_eq!(err.public_message(), BUSY_MESSAGE);
        assert!(!err.public_message().contains("imagen"));
        assert_eq!(err.attempts().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_error_display() {
        let err = PosterError::Api {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "API error: 503 - overloaded");

        let err = PosterError::NoCompatibleProvider {
            aspect_ratio: AspectRatio::Landscape,
        };
        assert_eq!(
            err.to_string(),
            "no registered provider supports aspect ratio 16:9"
        );
        assert!(err.attempts().is_none());
    }
}
