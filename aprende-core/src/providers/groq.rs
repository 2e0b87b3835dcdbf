//! Groq adapter: OpenAI-compatible chat completions, text only

use super::adapter::{parse_body, Classification, Provider};
use super::openai::types::{ChatCompletionResponse, OpenAIContent, OpenAIMessage, OpenAIRequest};
use super::ProviderConfig;
use crate::content::{ProviderName, UserContent};
use crate::http::error::status_failure_message;
use crate::normalize::text_only;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;

const EMPTY_RESPONSE: &str = "Resposta vazia do Groq";

/// Groq provider. Attachments are replaced by textual disclaimers.
pub struct GroqProvider {
    config: ProviderConfig,
}

impl GroqProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn to_groq_request(&self, content: &UserContent, system_prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![
                OpenAIMessage::system(system_prompt),
                OpenAIMessage {
                    role: "user".to_string(),
                    content: OpenAIContent::Text(text_only(content)),
                },
            ],
        }
    }
}

impl Provider for GroqProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Groq
    }

    fn url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_key.expose_secret()),
        );
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn build_request(&self, content: &UserContent, system_prompt: &str) -> Value {
        serde_json::to_value(self.to_groq_request(content, system_prompt)).unwrap_or(Value::Null)
    }

    fn classify(&self, status: StatusCode, body: &str) -> Classification {
        let raw = parse_body(body);
        if !status.is_success() {
            return Classification::failure(status_failure_message(status, raw.as_ref()));
        }
        let response: ChatCompletionResponse = raw
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        match response.first_content() {
            Some(text) => Classification::success(text),
            None => Classification::failure(EMPTY_RESPONSE),
        }
    }
}
