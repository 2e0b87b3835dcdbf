//! OpenAI API types
//!
//! These types match the chat completions wire format. Groq speaks the same
//! dialect and reuses them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<OpenAIMessage>,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: OpenAIContent,
}

impl OpenAIMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: OpenAIContent::Text(content.into()),
        }
    }

    pub fn user(content: OpenAIContent) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Message content (can be string or array of parts)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIContentPart>),
}

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OpenAIContentPart {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "image_url")]
    ImageUrl { image_url: OpenAIImageUrl },
}

/// Image reference; here always a `data:` URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAIImageUrl {
    pub url: String,
}

/// Chat completion response. Everything is optional: a missing piece is a
/// classification decision, not a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub choices: Option<Vec<OpenAIChoice>>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub message: Option<OpenAIResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .as_ref()?
            .first()?
            .message
            .as_ref()?
            .content
            .as_deref()
    }
}
