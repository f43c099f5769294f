use crate::{
    clients::ReasoningBackend,
    config::ReasoningConfig,
    error::{PosterError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ReasoningRequest},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// OpenAI-compatible chat completions client (Groq, OpenRouter, ...).
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model_id: String,
    default_max_tokens: i32,
    default_temperature: f32,
}

impl ChatClient {
    pub fn new(config: &ReasoningConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PosterError::Config("Reasoning API key is required".into()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PosterError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model_id: config.model_id.clone(),
            default_max_tokens: config.max_tokens,
            default_temperature: config.temperature,
        })
    }

    fn build_body(&self, request: &ReasoningRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".into(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: self.model_id.clone(),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: request.temperature.unwrap_or(self.default_temperature),
        }
    }

    fn parse_content(body: &str) -> Result<String> {
        let parsed: ChatCompletionResponse = serde_json::from_str(body)
            .map_err(|e| PosterError::Response(format!("Invalid chat response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PosterError::Response("Chat response had no content".into()))
    }
}

#[async_trait]
impl ReasoningBackend for ChatClient {
    async fn complete(&self, request: &ReasoningRequest) -> Result<String> {
        let body = self.build_body(request);
        log::info!("Invoking model: {}", self.model_id);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            log::error!("Chat completion failed with status {}", status);
            return Err(PosterError::Api {
                status: status.as_u16(),
                message: text.chars().take(300).collect(),
            });
        }

        Self::parse_content(&text)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ChatClient {
        let config = ReasoningConfig::new().with_api_key("test-key");
        ChatClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_build_body_with_system() {
        let request = ReasoningRequest::new("a poster for a bakery")
            .with_system("You write poster copy.")
            .with_temperature(0.3);
        let body = client().build_body(&request);
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].content, "a poster for a bakery");
        assert_eq!(body.temperature, 0.3);
        assert_eq!(body.max_tokens, 2000);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ReasoningConfig::new()
            .with_api_key("k")
            .with_base_url("https://api.groq.com/openai/v1/");
        let client = ChatClient::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint,
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"intent\": \"people\"}"}}]}"#;
        assert_eq!(
            ChatClient::parse_content(body).unwrap(),
            r#"{"intent": "people"}"#
        );
        assert!(ChatClient::parse_content(r#"{"choices": []}"#).is_err());
    }
}
