use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PosterError;

/// Aspect ratios accepted by the generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardPortrait,
    #[serde(rename = "3:2")]
    Photo,
    #[serde(rename = "2:3")]
    PhotoPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 7] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Standard,
        AspectRatio::StandardPortrait,
        AspectRatio::Photo,
        AspectRatio::PhotoPortrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::StandardPortrait => "3:4",
            AspectRatio::Photo => "3:2",
            AspectRatio::PhotoPortrait => "2:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| PosterError::Request(format!("Unsupported aspect ratio: {}", s)))
    }
}

/// Content categories the planner routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCategory {
    People,
    TextDesign,
    Nature,
    Artistic,
    Realistic,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 5] = [
        ContentCategory::People,
        ContentCategory::TextDesign,
        ContentCategory::Nature,
        ContentCategory::Artistic,
        ContentCategory::Realistic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::People => "people",
            ContentCategory::TextDesign => "text-design",
            ContentCategory::Nature => "nature",
            ContentCategory::Artistic => "artistic",
            ContentCategory::Realistic => "realistic",
        }
    }

    /// Lenient mapping from the intent label a reasoning model writes back.
    pub fn from_intent(intent: &str) -> Option<Self> {
        let intent = intent.trim().to_lowercase();
        match intent.as_str() {
            "people" | "portrait" | "person" | "character" | "characters" => {
                Some(ContentCategory::People)
            }
            "text-design" | "text_design" | "text" | "design" | "poster" | "text-heavy" => {
                Some(ContentCategory::TextDesign)
            }
            "nature" | "landscape" | "scenery" => Some(ContentCategory::Nature),
            "artistic" | "stylized" | "art" | "creative" => Some(ContentCategory::Artistic),
            "realistic" | "general" | "general-realistic" | "photo" => {
                Some(ContentCategory::Realistic)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vocabulary a provider responds best to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    Photographic,
    Typographic,
    Artistic,
    Environmental,
}
