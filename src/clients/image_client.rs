use crate::{
    clients::{ImageBackend, ImageFetcher},
    config::ImageApiConfig,
    error::{PosterError, Result},
    models::ImageCall,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ImagesApiResponse {
    data: Vec<ImagesApiItem>,
}

#[derive(Deserialize)]
struct ImagesApiItem {
    url: Option<String>,
}

/// OpenAI-compatible `images/generations` client.
#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(config: &ImageApiConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PosterError::Config("Image API key is required".into()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PosterError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
        })
    }

    fn parse_references(body: &str) -> Result<Vec<String>> {
        let parsed: ImagesApiResponse = serde_json::from_str(body)
            .map_err(|e| PosterError::Response(format!("Invalid images response: {}", e)))?;

        let urls: Vec<String> = parsed.data.into_iter().filter_map(|item| item.url).collect();
        if urls.is_empty() {
            return Err(PosterError::Response("No images generated".into()));
        }
        Ok(urls)
    }
}

#[async_trait]
impl ImageBackend for ImageClient {
    async fn generate(&self, call: &ImageCall) -> Result<Vec<String>> {
        log::debug!(
            "Image request: model={} n={} size={}",
            call.model,
            call.n,
            call.size
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(call)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(PosterError::Api {
                status: status.as_u16(),
                message: body.chars().take(300).collect(),
            });
        }

        Self::parse_references(&body)
    }
}

/// Plain HTTP(S) GET fetcher for generated images.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PosterError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let response = self.client.get(reference).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PosterError::Api {
                status: status.as_u16(),
                message: format!("GET {} failed", reference),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_references() {
        let body = r#"{"created": 1, "data": [{"url": "https://cdn/a.png"}, {"url": "https://cdn/b.png"}]}"#;
        assert_eq!(
            ImageClient::parse_references(body).unwrap(),
            vec!["https://cdn/a.png", "https://cdn/b.png"]
        );
    }

    #[test]
    fn test_parse_references_rejects_empty_and_malformed() {
        assert!(matches!(
            ImageClient::parse_references(r#"{"data": []}"#),
            Err(PosterError::Response(_))
        ));
        assert!(matches!(
            ImageClient::parse_references(r#"{"data": [{"b64_json": "AAAA"}]}"#),
            Err(PosterError::Response(_))
        ));
        assert!(matches!(
            ImageClient::parse_references("<html>502</html>"),
            Err(PosterError::Response(_))
        ));
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = ImageApiConfig::new();
        assert!(matches!(
            ImageClient::new(&config, Duration::from_secs(5)),
            Err(PosterError::Config(_))
        ));
    }
}
