//! Canonical request and result types
//!
//! These are the shapes the front end posts to the generation endpoint and
//! the shape of a successful answer. Every provider adapter starts from
//! [`UserContent`] and derives its own wire format from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an upstream LLM provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Groq,
    Gemini,
    OpenAI,
}

impl ProviderName {
    /// Human-facing name used in aggregated failure messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
        }
    }

    /// Wire identifier, as returned in the `provider` field of a result
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Base64 payload of an image or document part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub media_type: String,
    pub data: String,
}

/// One element of a multimodal user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { source: MediaSource },
    Document { source: MediaSource },
    /// Part types this gateway does not understand; ignored by every adapter
    #[serde(other)]
    Unsupported,
}

impl ContentPart {
    /// Text shortcut
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image shortcut
    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            source: MediaSource {
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }

    /// Document shortcut
    pub fn document(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Document {
            source: MediaSource {
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }

    /// Binary payload carried by image and document parts
    pub fn attachment(&self) -> Option<&MediaSource> {
        match self {
            Self::Image { source } | Self::Document { source } => Some(source),
            _ => None,
        }
    }
}

/// User content: either plain text or an ordered list of parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl UserContent {
    /// True for an empty string or an empty part list
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<&str> for UserContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for UserContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ContentPart>> for UserContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// A validated generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub user_content: UserContent,
    pub system_prompt: String,
}

impl GenerationRequest {
    pub fn new(user_content: impl Into<UserContent>, system_prompt: impl Into<String>) -> Self {
        Self {
            user_content: user_content.into(),
            system_prompt: system_prompt.into(),
        }
    }

    /// Parse and validate a raw JSON body.
    ///
    /// Returns `None` when the body is not JSON, when either field is absent,
    /// `null` or empty, or when `userContent` has an unexpected shape.
    pub fn from_json(body: &[u8]) -> Option<Self> {
        let raw: RawGenerationRequest = serde_json::from_slice(body).ok()?;
        let user_content = raw.user_content.filter(|c| !c.is_empty())?;
        let system_prompt = raw.system_prompt.filter(|p| !p.is_empty())?;
        Some(Self {
            user_content,
            system_prompt,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGenerationRequest {
    #[serde(default)]
    user_content: Option<UserContent>,
    #[serde(default)]
    system_prompt: Option<String>,
}

/// Text produced by the first provider that succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub text: String,
    pub provider: ProviderName,
    /// Providers that failed before this one, in attempt order
    #[serde(skip)]
    pub fallbacks: Vec<crate::providers::ProviderFailure>,
}

impl GenerationResult {
    /// Whether an earlier provider in the chain failed
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}
