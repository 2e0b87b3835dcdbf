//! Google Gemini adapter (`generateContent`, query-string credential)

use super::adapter::{parse_body, Classification, ClassificationMode, Provider};
use super::ProviderConfig;
use crate::content::{ProviderName, UserContent};
use crate::http::error::{error_message, error_present, http_status_message, status_failure_message};
use crate::normalize::single_slot;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

const EMPTY_RESPONSE: &str = "Resposta vazia do Gemini";

/// Gemini request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

/// Request part: inline binary or text
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
}

/// `generateContent` response; every field optional so that classification,
/// not deserialization, decides what a missing piece means
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl Candidate {
    fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
    }
}

/// Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn classification(&self) -> ClassificationMode {
        self.config.classification
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Typed request body: at most one inline part, then exactly one text part
    pub fn to_gemini_request(&self, content: &UserContent, system_prompt: &str) -> GeminiRequest {
        let slot = single_slot(content);
        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = slot.attachment {
            parts.push(GeminiPart::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.mime_type,
                    data: attachment.data,
                },
            });
        }
        parts.push(GeminiPart::Text {
            text: format!("{}\n\n{}", system_prompt, slot.text),
        });

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_tokens,
            },
        }
    }

    fn classify_minimal(status: StatusCode, response: &GenerateContentResponse) -> Classification {
        if error_present(response.error.as_ref()) {
            return Classification::failure(
                response
                    .error
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| http_status_message(status)),
            );
        }
        let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) else {
            return Classification::failure(EMPTY_RESPONSE);
        };
        match candidate.first_text() {
            Some(text) => Classification::success(text),
            None => Classification::failure(EMPTY_RESPONSE),
        }
    }

    fn classify_hardened(
        status: StatusCode,
        raw: Option<&Value>,
        response: &GenerateContentResponse,
    ) -> Classification {
        // quota and auth failures
        if !status.is_success() {
            return Classification::failure(status_failure_message(status, raw));
        }
        if error_present(response.error.as_ref()) {
            return Classification::failure(
                response
                    .error
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| EMPTY_RESPONSE.to_string()),
            );
        }
        // prompt blocked before any candidate was produced
        let Some(candidate) = response.candidates.as_ref().and_then(|c| c.first()) else {
            let block_reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref());
            return match block_reason {
                Some(reason) => {
                    Classification::failure(format!("Gemini bloqueou a resposta: {}", reason))
                }
                None => Classification::failure(EMPTY_RESPONSE),
            };
        };
        // safety filtering, recitation and friends
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" && reason != "MAX_TOKENS" {
                return Classification::failure(format!(
                    "Gemini interrompeu a geração: {}",
                    reason
                ));
            }
        }
        match candidate.first_text() {
            Some(text) if !text.trim().is_empty() => Classification::success(text),
            _ => Classification::failure(EMPTY_RESPONSE),
        }
    }
}

impl Provider for GeminiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    fn url(&self) -> String {
        let key: String =
            url::form_urlencoded::byte_serialize(self.config.api_key.expose_secret().as_bytes())
                .collect();
        format!("{}?key={}", self.endpoint(), key)
    }

    fn log_url(&self) -> String {
        self.endpoint()
    }

    fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn build_request(&self, content: &UserContent, system_prompt: &str) -> Value {
        serde_json::to_value(self.to_gemini_request(content, system_prompt))
            .unwrap_or(Value::Null)
    }

    fn classify(&self, status: StatusCode, body: &str) -> Classification {
        let Some(raw) = parse_body(body) else {
            return Classification::failure(format!(
                "Resposta inválida do Gemini (HTTP {})",
                status.as_u16()
            ));
        };
        // a malformed candidate must not hide an explicit error object
        let response: GenerateContentResponse = serde_json::from_value(raw.clone())
            .unwrap_or_else(|_| GenerateContentResponse {
                error: raw.get("error").cloned(),
                ..Default::default()
            });

        match self.config.classification {
            ClassificationMode::Minimal => Self::classify_minimal(status, &response),
            ClassificationMode::Hardened => Self::classify_hardened(status, Some(&raw), &response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentPart;
    use serde_json::json;
    use test_case::test_case;

    fn provider(mode: ClassificationMode) -> GeminiProvider {
        GeminiProvider::new(ProviderConfig {
            classification: mode,
            ..ProviderConfig::defaults_for(ProviderName::Gemini).with_api_key("g-key")
        })
    }

    fn candidate(text: &str, finish_reason: &str) -> String {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": finish_reason
            }]
        })
        .to_string()
    }

    #[test]
    fn test_url_carries_key_and_log_url_does_not() {
        let provider = provider(ClassificationMode::Minimal);
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent?key=g-key"
        );
        assert!(!provider.log_url().contains("g-key"));
    }

    #[test]
    fn test_request_with_image_has_one_inline_part_then_text() {
        let content = UserContent::Parts(vec![
            ContentPart::text("ignorado"),
            ContentPart::image("image/png", "BASE64"),
            ContentPart::text("Matematica, 4o ano, pagina 10"),
        ]);
        let body = provider(ClassificationMode::Minimal).build_request(&content, "Seja didatico");
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "BASE64"}},
                        {"text": "Seja didatico\n\nMatematica, 4o ano, pagina 10"}
                    ]
                }],
                "generationConfig": {"maxOutputTokens": 8192}
            })
        );
    }

    #[test]
    fn test_plain_text_request_has_single_text_part() {
        let body = provider(ClassificationMode::Minimal)
            .build_request(&UserContent::from("Historia"), "sys");
        assert_eq!(body["contents"][0]["parts"], json!([{"text": "sys\n\nHistoria"}]));
    }

    #[test_case(ClassificationMode::Minimal ; "minimal")]
    #[test_case(ClassificationMode::Hardened ; "hardened")]
    fn test_success_is_trimmed(mode: ClassificationMode) {
        let outcome = provider(mode).classify(StatusCode::OK, &candidate("  Resposta \n", "STOP"));
        assert_eq!(outcome, Classification::Success("Resposta".into()));
    }

    #[test]
    fn test_minimal_explicit_error() {
        let body = json!({"error": {"code": 429, "message": "Resource has been exhausted"}}).to_string();
        assert_eq!(
            provider(ClassificationMode::Minimal).classify(StatusCode::TOO_MANY_REQUESTS, &body),
            Classification::Failure("Resource has been exhausted".into())
        );
    }

    #[test]
    fn test_minimal_ignores_status_and_finish_reason() {
        let provider = provider(ClassificationMode::Minimal);
        assert!(provider
            .classify(StatusCode::INTERNAL_SERVER_ERROR, &candidate("ok", "STOP"))
            .is_success());
        assert!(provider
            .classify(StatusCode::OK, &candidate("parcial", "SAFETY"))
            .is_success());
    }

    #[test_case(ClassificationMode::Minimal ; "minimal")]
    #[test_case(ClassificationMode::Hardened ; "hardened")]
    fn test_missing_candidates_is_empty_response(mode: ClassificationMode) {
        assert_eq!(
            provider(mode).classify(StatusCode::OK, r#"{"candidates": []}"#),
            Classification::Failure(EMPTY_RESPONSE.into())
        );
    }

    #[test]
    fn test_hardened_status_without_error_body() {
        assert_eq!(
            provider(ClassificationMode::Hardened).classify(StatusCode::SERVICE_UNAVAILABLE, "{}"),
            Classification::Failure("Erro HTTP 503".into())
        );
    }

    #[test]
    fn test_hardened_status_with_error_body() {
        let body = json!({"error": {"message": "API key not valid. Please pass a valid API key."}});
        assert_eq!(
            provider(ClassificationMode::Hardened)
                .classify(StatusCode::BAD_REQUEST, &body.to_string()),
            Classification::Failure("API key not valid. Please pass a valid API key.".into())
        );
    }

    #[test]
    fn test_hardened_block_reason() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string();
        assert_eq!(
            provider(ClassificationMode::Hardened).classify(StatusCode::OK, &body),
            Classification::Failure("Gemini bloqueou a resposta: SAFETY".into())
        );
    }

    #[test_case("SAFETY" ; "safety")]
    #[test_case("RECITATION" ; "recitation")]
    #[test_case("OTHER" ; "other")]
    fn test_hardened_abnormal_finish_reason(reason: &str) {
        match provider(ClassificationMode::Hardened).classify(StatusCode::OK, &candidate("x", reason)) {
            Classification::Failure(message) => assert!(message.contains(reason)),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_hardened_max_tokens_with_text_succeeds() {
        assert_eq!(
            provider(ClassificationMode::Hardened)
                .classify(StatusCode::OK, &candidate("texto truncado", "MAX_TOKENS")),
            Classification::Success("texto truncado".into())
        );
    }

    #[test]
    fn test_hardened_missing_text() {
        let body = json!({"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]});
        assert_eq!(
            provider(ClassificationMode::Hardened).classify(StatusCode::OK, &body.to_string()),
            Classification::Failure(EMPTY_RESPONSE.into())
        );
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(
            provider(ClassificationMode::Hardened).classify(StatusCode::BAD_GATEWAY, "<html>"),
            Classification::Failure("Resposta inválida do Gemini (HTTP 502)".into())
        );
    }

    #[test_case(ClassificationMode::Minimal ; "minimal")]
    #[test_case(ClassificationMode::Hardened ; "hardened")]
    fn test_error_survives_malformed_candidates(mode: ClassificationMode) {
        let body = json!({
            "error": {"code": 400, "message": "API key not valid"},
            "candidates": [{"content": {"parts": [{"text": 42}]}}]
        })
        .to_string();
        assert_eq!(
            provider(mode).classify(StatusCode::OK, &body),
            Classification::Failure("API key not valid".into())
        );
    }

    #[test_case(ClassificationMode::Minimal, StatusCode::OK, &candidate("  Plano  ", "STOP") ; "minimal success")]
    #[test_case(ClassificationMode::Hardened, StatusCode::OK, &candidate("", "SAFETY") ; "hardened failure")]
    #[test_case(ClassificationMode::Hardened, StatusCode::TOO_MANY_REQUESTS, "{}" ; "hardened status")]
    fn test_repeated_calls_are_identical(mode: ClassificationMode, status: StatusCode, body: &str) {
        let provider = provider(mode);
        assert_eq!(provider.classify(status, body), provider.classify(status, body));

        let content = UserContent::Parts(vec![
            ContentPart::image("image/png", "PNG"),
            ContentPart::text("Historia, 5o ano"),
        ]);
        assert_eq!(
            provider.build_request(&content, "Sistema").to_string(),
            provider.build_request(&content, "Sistema").to_string()
        );
    }
}
