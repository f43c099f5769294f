use std::env;

pub const DEFAULT_IMAGE_API_URL: &str = "https://api.a4f.co/v1/images/generations";
pub const DEFAULT_REASONING_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_REASONING_MODEL: &str = "moonshotai/kimi-k2-instruct";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct ImageApiConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningKind {
    Chat,
    Bedrock,
}

#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub kind: ReasoningKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_id: String,
    pub max_tokens: i32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub image_api: ImageApiConfig,
    pub reasoning: ReasoningConfig,
    pub bedrock: Option<BedrockConfig>,
    pub tier_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ImageApiConfig {
    fn default() -> Self {
        ImageApiConfig {
            api_url: DEFAULT_IMAGE_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl ImageApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_url =
            env::var("IMAGEGEN_API_URL").unwrap_or_else(|_| DEFAULT_IMAGE_API_URL.to_string());
        let api_key = env::var("IMAGEGEN_API_KEY").ok();

        ImageApiConfig { api_url, api_key }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        ReasoningConfig {
            kind: ReasoningKind::Chat,
            base_url: DEFAULT_REASONING_URL.to_string(),
            api_key: None,
            model_id: DEFAULT_REASONING_MODEL.to_string(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

impl ReasoningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let kind = match env::var("REASONING_BACKEND").ok().as_deref() {
            Some("bedrock") => ReasoningKind::Bedrock,
            _ => ReasoningKind::Chat,
        };
        let base_url = env::var("GROQ_BASE_URL").unwrap_or(defaults.base_url);
        let api_key = env::var("GROQ_API_KEY").ok();
        let model_id = env::var("REASONING_MODEL").unwrap_or(defaults.model_id);
        let max_tokens = env::var("REASONING_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_tokens);

        ReasoningConfig {
            kind,
            base_url,
            api_key,
            model_id,
            max_tokens,
            temperature: defaults.temperature,
        }
    }

    pub fn with_kind(mut self, kind: ReasoningKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        BedrockConfig {
            region: None,
            access_key: None,
            secret_key: None,
        }
    }
}

impl BedrockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .ok();
        let access_key = env::var("AWS_ACCESS_KEY_ID").ok();
        let secret_key = env::var("AWS_SECRET_ACCESS_KEY").ok();

        BedrockConfig {
            region,
            access_key,
            secret_key,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            image_api: ImageApiConfig::default(),
            reasoning: ReasoningConfig::default(),
            bedrock: None,
            tier_delay_ms: 0,
            request_timeout_secs: 120,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let tier_delay_ms = env::var("TIER_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.tier_delay_ms);
        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);
        let reasoning = ReasoningConfig::from_env();
        let bedrock = match reasoning.kind {
            ReasoningKind::Bedrock => Some(BedrockConfig::from_env()),
            ReasoningKind::Chat => None,
        };

        Config {
            port,
            image_api: ImageApiConfig::from_env(),
            reasoning,
            bedrock,
            tier_delay_ms,
            request_timeout_secs,
        }
    }

    /// Port the HTTP server binds, `PORT` or 8000.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_image_api(mut self, config: ImageApiConfig) -> Self {
        self.image_api = config;
        self
    }

    pub fn with_reasoning(mut self, config: ReasoningConfig) -> Self {
        self.reasoning = config;
        self
    }

    pub fn with_bedrock(mut self, config: BedrockConfig) -> Self {
        self.bedrock = Some(config);
        self.reasoning.kind = ReasoningKind::Bedrock;
        self
    }

    pub fn with_tier_delay_ms(mut self, delay_ms: u64) -> Self {
        self.tier_delay_ms = delay_ms;
        self
    }
}
