//! OpenAI client implementation

use super::converter::to_openai_content;
use super::types::{ChatCompletionResponse, OpenAIMessage, OpenAIRequest};
use crate::content::{ProviderName, UserContent};
use crate::http::error::{error_message, error_present, http_status_message, status_failure_message};
use crate::providers::adapter::{parse_body, Classification, ClassificationMode, Provider};
use crate::providers::ProviderConfig;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;

const MALFORMED_RESPONSE: &str = "Resposta inválida da OpenAI";

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: ProviderConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn classification(&self) -> ClassificationMode {
        self.config.classification
    }

    /// System message plus one user message, plain or multipart
    pub fn to_openai_request(&self, content: &UserContent, system_prompt: &str) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![
                OpenAIMessage::system(system_prompt),
                OpenAIMessage::user(to_openai_content(content)),
            ],
        }
    }
}

impl Provider for OpenAIProvider {
    fn name(&self) -> ProviderName {
        ProviderName::OpenAI
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
        serde_json::to_value(self.to_openai_request(content, system_prompt)).unwrap_or(Value::Null)
    }

    fn classify(&self, status: StatusCode, body: &str) -> Classification {
        let raw = parse_body(body);

        // The observed contract only reads the body. The status guard is opt-in.
        if self.config.classification == ClassificationMode::Hardened && !status.is_success() {
            return Classification::failure(status_failure_message(status, raw.as_ref()));
        }

        let Some(raw) = raw else {
            return Classification::failure(format!(
                "{} (HTTP {})",
                MALFORMED_RESPONSE,
                status.as_u16()
            ));
        };
        let response: ChatCompletionResponse =
            serde_json::from_value(raw).unwrap_or_default();

        if error_present(response.error.as_ref()) {
            return Classification::failure(
                response
                    .error
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| http_status_message(status)),
            );
        }
        match response.first_content() {
            Some(text) => Classification::success(text),
            None => Classification::failure(MALFORMED_RESPONSE),
        }
    }
}
