//! Provider adapter trait and response classification

use crate::content::{ProviderName, UserContent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use reqwest::StatusCode;

/// Core provider trait that every upstream LLM implements.
///
/// Adapters are plain descriptions of a provider: where to send the request,
/// how to authenticate, how to shape the body and how to read the answer.
/// Transport lives in [`crate::http::HttpExecutor`].
pub trait Provider: Send + Sync {
    /// Provider identity
    fn name(&self) -> ProviderName;

    /// Full request URL, including any query-string credential
    fn url(&self) -> String;

    /// URL safe to log (no credentials)
    fn log_url(&self) -> String {
        self.url()
    }

    /// Headers required for this provider
    fn headers(&self) -> HashMap<String, String>;

    /// Serialize the content and system prompt into the provider's body
    fn build_request(&self, content: &UserContent, system_prompt: &str) -> Value;

    /// Decide whether a raw response is a success or a failure
    fn classify(&self, status: StatusCode, body: &str) -> Classification;
}

/// Outcome of reading one provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Trimmed generated text
    Success(String),
    /// Failure message, surfaced verbatim in the aggregate error
    Failure(String),
}

impl Classification {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// Build a success from raw text, trimming surrounding whitespace
    pub fn success(text: &str) -> Self {
        Self::Success(text.trim().to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// How strictly a provider response is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Only look at the body: an explicit `error` field or a missing result
    #[default]
    Minimal,
    /// Check the HTTP status first, then the body, most specific message first
    Hardened,
}

/// Parse a body as JSON, `None` for anything that is not
pub(crate) fn parse_body(body: &str) -> Option<Value> {
    serde_json::from_str(body).ok()
}
