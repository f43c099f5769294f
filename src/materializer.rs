//! Fetches generated images and encodes them for the caller.

use crate::{
    clients::ImageFetcher,
    error::{PosterError, Result},
    models::{ImageArtifact, ImageFormat},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;
use std::sync::Arc;

pub struct Materializer {
    fetcher: Arc<dyn ImageFetcher>,
}

impl Materializer {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn materialize(&self, reference: &str) -> Result<ImageArtifact> {
        let bytes = self
            .fetcher
            .fetch(reference)
            .await
            .map_err(|e| PosterError::Fetch {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;

        if bytes.is_empty() {
            return Err(PosterError::Fetch {
                reference: reference.to_string(),
                message: "empty body".into(),
            });
        }

        let mime_type = ImageFormat::from_magic_bytes(&bytes)
            .map(|format| format.mime_type())
            .unwrap_or("application/octet-stream");

        Ok(ImageArtifact {
            data: STANDARD.encode(&bytes),
            mime_type: mime_type.to_string(),
            byte_len: bytes.len(),
        })
    }

    /// Materializes every reference, keeping order. Fails on the first unusable one.
    pub async fn materialize_all(&self, references: &[String]) -> Result<Vec<ImageArtifact>> {
        try_join_all(references.iter().map(|r| self.materialize(r))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFetcher;

    #[tokio::test]
    async fn test_round_trip_is_byte_identical() {
        let materializer = Materializer::new(Arc::new(MemoryFetcher::default()));
        let artifact = materializer.materialize("mem://vendor/c/0").await.unwrap();

        let decoded = STANDARD.decode(&artifact.data).unwrap();
        assert_eq!(decoded, MemoryFetcher::payload_for("mem://vendor/c/0"));
        assert_eq!(artifact.byte_len, decoded.len());
        assert_eq!(artifact.mime_type, "image/png");
        assert!(artifact.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_distinctly() {
        let materializer = Materializer::new(Arc::new(MemoryFetcher::missing(&["mem://gone"])));
        let err = materializer.materialize("mem://gone").await.unwrap_err();
        match err {
            PosterError::Fetch { reference, .. } => assert_eq!(reference, "mem://gone"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_materialize_all_keeps_order() {
        let materializer = Materializer::new(Arc::new(MemoryFetcher::default()));
        let references = vec!["mem://x/0".to_string(), "mem://x/1".to_string()];
        let artifacts = materializer.materialize_all(&references).await.unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(
            STANDARD.decode(&artifacts[1].data).unwrap(),
            MemoryFetcher::payload_for("mem://x/1")
        );
    }
}
