use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AspectRatio;

/// Upper bound on images per request, whatever the caller asks for.
pub const MAX_IMAGES_PER_REQUEST: u32 = 3;

/// Fixed creative constraints the caller wants honoured verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerConstraints {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub objects: Vec<String>,
}

impl LayerConstraints {
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.text.is_empty() && self.objects.is_empty()
    }
}

/// A validated image generation request. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    id: String,
    prompt: String,
    aspect_ratio: AspectRatio,
    count: u32,
    theme: Option<String>,
    constraints: LayerConstraints,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio, count: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            aspect_ratio,
            count: count.clamp(1, MAX_IMAGES_PER_REQUEST),
            theme: None,
            constraints: LayerConstraints::default(),
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_constraints(mut self, constraints: LayerConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn constraints(&self) -> &LayerConstraints {
        &self.constraints
    }
}

/// Wire body of a single provider call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageCall {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A fetched image, base64 encoded for the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageArtifact {
    pub data: String, // Base64 encoded
    pub mime_type: String,
    pub byte_len: usize,
}

impl ImageArtifact {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
