use crate::{
    clients::ReasoningBackend,
    config::BedrockConfig,
    error::{PosterError, Result},
    models::{LlamaResponse, ReasoningRequest, TitanTextResponse},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use serde_json::{json, Value};

/// Reasoning backend served by an AWS Bedrock text model.
#[derive(Clone)]
pub struct TextClient {
    client: Client,
    model_id: String,
}

impl TextClient {
    pub fn new(client: Client, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub async fn connect(config: &BedrockConfig, model_id: impl Into<String>) -> Result<Self> {
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key, &config.secret_key)
        {
            aws_config::from_env()
                .credentials_provider(aws_sdk_bedrockruntime::config::Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    "postergen",
                ))
                .region(aws_sdk_bedrockruntime::config::Region::new(
                    config
                        .region
                        .clone()
                        .unwrap_or_else(|| "us-east-1".to_string()),
                ))
                .load()
                .await
        } else {
            aws_config::load_from_env().await
        };

        Ok(Self::new(Client::new(&aws_config), model_id))
    }

    fn build_request_payload(request: &ReasoningRequest, model_id: &str) -> Result<Value> {
        let max_tokens = request.max_tokens.unwrap_or(512);
        let temperature = request.temperature.unwrap_or(0.7);
        let inline_prompt = match &request.system {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        let payload = match model_id {
            id if id.starts_with("amazon.titan") => json!({
                "inputText": inline_prompt,
                "textGenerationConfig": {
                    "maxTokenCount": max_tokens,
                    "temperature": temperature,
                    "topP": 0.9
                }
            }),
            id if id.starts_with("meta.llama") => json!({
                "prompt": inline_prompt,
                "max_gen_len": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            id if id.starts_with("mistral.mistral") => json!({
                "prompt": inline_prompt,
                "max_tokens": max_tokens,
                "temperature": temperature,
                "top_p": 0.9
            }),
            id if id.starts_with("anthropic.claude") || id.starts_with("arn:aws:bedrock") => {
                let mut body = json!({
                    "messages": [
                        {
                            "role": "user",
                            "content": request.prompt
                        }
                    ],
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                    "anthropic_version": "bedrock-2023-05-31"
                });
                if let Some(system) = &request.system {
                    body["system"] = json!(system);
                }
                body
            }
            _ => {
                return Err(PosterError::Request(format!(
                    "Unsupported model ID: {}",
                    model_id
                )))
            }
        };

        Ok(payload)
    }

    fn extract_text(body: &str, model_id: &str) -> Result<String> {
        let text = match model_id {
            id if id.starts_with("amazon.titan") => {
                let parsed: TitanTextResponse = serde_json::from_str(body)
                    .map_err(|e| PosterError::Response(e.to_string()))?;
                parsed.output_text
            }
            id if id.starts_with("meta.llama") => {
                let parsed: LlamaResponse = serde_json::from_str(body)
                    .map_err(|e| PosterError::Response(e.to_string()))?;
                parsed.generation
            }
            _ => {
                let json: Value = serde_json::from_str(body)
                    .map_err(|e| PosterError::Response(e.to_string()))?;
                json["content"][0]["text"]
                    .as_str()
                    .or_else(|| json["outputs"][0]["text"].as_str())
                    .map(String::from)
                    .ok_or_else(|| {
                        PosterError::Response("Unexpected model response shape".into())
                    })?
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl ReasoningBackend for TextClient {
    async fn complete(&self, request: &ReasoningRequest) -> Result<String> {
        let payload = Self::build_request_payload(request, &self.model_id)?;
        let request_json = serde_json::to_string(&payload)?;

        log::info!("Invoking model: {}", self.model_id);
        log::debug!("Text generation request payload: {}", request_json);

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                if let Some(service_error) = e.as_service_error() {
                    log::error!("Service error code: {:?}", service_error.code());
                    PosterError::Aws(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    PosterError::Aws(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        let body =
            String::from_utf8(response_bytes).map_err(|e| PosterError::Response(e.to_string()))?;
        Self::extract_text(&body, &self.model_id)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_for_claude_carries_system() {
        let request = ReasoningRequest::new("classify this").with_system("be terse");
        let payload =
            TextClient::build_request_payload(&request, "anthropic.claude-3-haiku-20240307-v1:0")
                .unwrap();
        assert_eq!(payload["system"], "be terse");
        assert_eq!(payload["messages"][0]["content"], "classify this");
        assert_eq!(payload["anthropic_version"], "bedrock-2023-05-31");
    }

    #[test]
    fn test_payload_for_llama_inlines_system() {
        let request = ReasoningRequest::new("classify this")
            .with_system("be terse")
            .with_max_tokens(64);
        let payload =
            TextClient::build_request_payload(&request, "meta.llama3-8b-instruct-v1:0").unwrap();
        assert_eq!(payload["prompt"], "be terse\n\nclassify this");
        assert_eq!(payload["max_gen_len"], 64);
    }

    #[test]
    fn test_unsupported_model() {
        let request = ReasoningRequest::new("x");
        assert!(TextClient::build_request_payload(&request, "cohere.embed").is_err());
    }

    #[test]
    fn test_extract_text_per_family() {
        let titan = r#"{"outputText": "hi", "completionReason": "FINISH"}"#;
        assert_eq!(
            TextClient::extract_text(titan, "amazon.titan-text-express-v1").unwrap(),
            "hi"
        );
        let claude = r#"{"content": [{"type": "text", "text": "{}"}]}"#;
        assert_eq!(
            TextClient::extract_text(claude, "anthropic.claude-3").unwrap(),
            "{}"
        );
        let mistral = r#"{"outputs": [{"text": "ok", "stop_reason": "stop"}]}"#;
        assert_eq!(
            TextClient::extract_text(mistral, "mistral.mistral-7b").unwrap(),
            "ok"
        );
    }
}
