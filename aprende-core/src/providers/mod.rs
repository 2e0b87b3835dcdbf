//! Provider adapters and the fallback chain
//!
//! Each upstream LLM implements [`Provider`]: a stateless description of how
//! to shape a request and how to read the answer. [`ProviderChain`] walks the
//! configured adapters in order and stops at the first success.

pub mod adapter;
pub mod chain;
pub mod error;
pub mod gemini;
pub mod groq;
pub mod openai;

pub use adapter::{Classification, ClassificationMode, Provider};
pub use chain::{ChainBuilder, ProviderChain};
pub use error::{join_failures, AggregateFailure, ProviderError, ProviderFailure, ProviderResult};
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use openai::OpenAIProvider;

use crate::config::SecretString;
use crate::content::ProviderName;

/// Default output-token cap for every provider
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Resolved settings for one adapter
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub classification: ClassificationMode,
}

impl ProviderConfig {
    /// Stock endpoint and model for a provider, with an empty credential
    pub fn defaults_for(name: ProviderName) -> Self {
        let (base_url, model, classification) = match name {
            ProviderName::Groq => (
                "https://api.groq.com/openai/v1",
                "llama-3.3-70b-versatile",
                ClassificationMode::Hardened,
            ),
            ProviderName::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-2.5-flash",
                ClassificationMode::Minimal,
            ),
            ProviderName::OpenAI => (
                "https://api.openai.com/v1",
                "gpt-4o-mini",
                ClassificationMode::Minimal,
            ),
        };
        Self {
            api_key: SecretString::new(""),
            base_url: base_url.to_string(),
            model: model.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            classification,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_classification(mut self, classification: ClassificationMode) -> Self {
        self.classification = classification;
        self
    }
}

/// Create the adapter for a provider
pub fn create_provider(name: ProviderName, config: ProviderConfig) -> Box<dyn Provider> {
    match name {
        ProviderName::Groq => Box::new(GroqProvider::new(config)),
        ProviderName::Gemini => Box::new(GeminiProvider::new(config)),
        ProviderName::OpenAI => Box::new(OpenAIProvider::new(config)),
    }
}
