//! Ordered provider fallback
//!
//! The chain tries each adapter in priority order, one at a time, and stops
//! at the first success. Failures are recorded in attempt order and only
//! surfaced, joined, when every adapter has failed.

use crate::config::{ConfigError, GatewayConfig};
use crate::content::{GenerationResult, ProviderName, UserContent};
use crate::http::client::HttpClient;
use crate::http::{HttpExecutor, RequestOptions, DEFAULT_ATTEMPT_TIMEOUT};
use crate::providers::adapter::Provider;
use crate::providers::error::{AggregateFailure, ProviderError, ProviderFailure};
use crate::providers::create_provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed, ordered list of providers attempted for a request
pub struct ProviderChain {
    providers: Vec<Box<dyn Provider>>,
    executor: Arc<dyn HttpExecutor>,
    attempt_timeout: Duration,
}

impl ProviderChain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Build the chain described by `config`, using the reqwest executor
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let executor = HttpClient::with_config(config.connection.connect_timeout())?;
        Self::from_config_with_executor(config, Arc::new(executor))
    }

    /// Build the chain described by `config` on top of a given executor
    pub fn from_config_with_executor(
        config: &GatewayConfig,
        executor: Arc<dyn HttpExecutor>,
    ) -> Result<Self, ConfigError> {
        config
            .chain_providers()
            .into_iter()
            .fold(ChainBuilder::new(), |builder, (name, provider_config)| {
                builder.provider(create_provider(name, provider_config))
            })
            .executor(executor)
            .attempt_timeout(config.chain.attempt_timeout())
            .build()
    }

    /// Provider names in attempt order
    pub fn providers(&self) -> Vec<ProviderName> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Run one attempt, bounded by the per-attempt timeout
    async fn attempt(
        &self,
        provider: &dyn Provider,
        content: &UserContent,
        system_prompt: &str,
    ) -> Result<String, ProviderError> {
        let options = RequestOptions::new().with_timeout(self.attempt_timeout);
        debug!(
            "Attempting {} [request_id: {}]",
            provider.name(),
            options.request_id
        );
        match tokio::time::timeout(
            self.attempt_timeout,
            self.executor
                .execute(provider, content, system_prompt, &options),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderError::Timeout {
                after: self.attempt_timeout,
            }),
        }
    }

    /// Try every provider in order until one succeeds.
    ///
    /// Later providers are never contacted once one has succeeded.
    pub async fn generate(
        &self,
        content: &UserContent,
        system_prompt: &str,
    ) -> Result<GenerationResult, AggregateFailure> {
        let mut failures: Vec<ProviderFailure> = Vec::new();

        for (idx, provider) in self.providers.iter().enumerate() {
            match self.attempt(provider.as_ref(), content, system_prompt).await {
                Ok(text) => {
                    info!(
                        "Generation served by {} after {} attempt(s)",
                        provider.name(),
                        idx + 1
                    );
                    return Ok(GenerationResult {
                        text,
                        provider: provider.name(),
                        fallbacks: failures,
                    });
                }
                Err(error) => {
                    match self.providers.get(idx + 1) {
                        Some(next) => warn!(
                            "{} failed, falling back to {}: {}",
                            provider.name(),
                            next.name(),
                            error
                        ),
                        None => warn!(
                            "{} failed and no fallback is left: {}",
                            provider.name(),
                            error
                        ),
                    }
                    failures.push(ProviderFailure::new(provider.name(), &error));
                }
            }
        }

        Err(AggregateFailure { failures })
    }
}

/// Builder for [`ProviderChain`]
pub struct ChainBuilder {
    providers: Vec<Box<dyn Provider>>,
    executor: Option<Arc<dyn HttpExecutor>>,
    attempt_timeout: Duration,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            executor: None,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Append a provider; order of calls is attempt order
    pub fn provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ProviderChain, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::Invalid {
                message: "provider chain must contain at least one provider".to_string(),
            });
        }
        let executor = match self.executor {
            Some(executor) => executor,
            None => Arc::new(HttpClient::new()?),
        };
        Ok(ProviderChain {
            providers: self.providers,
            executor,
            attempt_timeout: self.attempt_timeout,
        })
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::adapter::Classification;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use reqwest::StatusCode;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct StubProvider(ProviderName);

    impl Provider for StubProvider {
        fn name(&self) -> ProviderName {
            self.0
        }
        fn url(&self) -> String {
            format!("http://stub/{}", self.0.as_str())
        }
        fn headers(&self) -> HashMap<String, String> {
            HashMap::new()
        }
        fn build_request(&self, _content: &UserContent, _system_prompt: &str) -> Value {
            Value::Null
        }
        fn classify(&self, _status: StatusCode, body: &str) -> Classification {
            Classification::success(body)
        }
    }

    /// Scripted outcomes per provider, plus a log of who was called
    #[derive(Default)]
    struct ScriptedExecutor {
        outcomes: HashMap<ProviderName, Result<String, ProviderError>>,
        delays: HashMap<ProviderName, Duration>,
        calls: Mutex<Vec<ProviderName>>,
    }

    impl ScriptedExecutor {
        fn with(mut self, name: ProviderName, outcome: Result<&str, &str>) -> Self {
            self.outcomes.insert(
                name,
                outcome
                    .map(str::to_string)
                    .map_err(ProviderError::rejected),
            );
            self
        }

        fn delayed(mut self, name: ProviderName, delay: Duration) -> Self {
            self.delays.insert(name, delay);
            self
        }

        fn calls(&self) -> Vec<ProviderName> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            provider: &dyn Provider,
            _content: &UserContent,
            _system_prompt: &str,
            _options: &RequestOptions,
        ) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push(provider.name());
            if let Some(delay) = self.delays.get(&provider.name()) {
                tokio::time::sleep(*delay).await;
            }
            self.outcomes
                .get(&provider.name())
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::rejected("unscripted")))
        }
    }

    fn chain(executor: Arc<ScriptedExecutor>, names: &[ProviderName]) -> ProviderChain {
        names
            .iter()
            .fold(ProviderChain::builder(), |b, name| {
                b.provider(Box::new(StubProvider(*name)))
            })
            .executor(executor)
            .build()
            .unwrap()
    }

    const THREE: [ProviderName; 3] = [ProviderName::Groq, ProviderName::Gemini, ProviderName::OpenAI];

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let executor = Arc::new(
            ScriptedExecutor::default()
                .with(ProviderName::Groq, Ok("da groq"))
                .with(ProviderName::Gemini, Ok("do gemini")),
        );
        let result = chain(executor.clone(), &THREE)
            .generate(&UserContent::from("x"), "sys")
            .await
            .unwrap();

        assert_eq!(result.text, "da groq");
        assert_eq!(result.provider, ProviderName::Groq);
        assert!(!result.used_fallback());
        assert_eq!(executor.calls(), vec![ProviderName::Groq]);
    }

    #[tokio::test]
    async fn test_third_provider_wins_after_two_failures() {
        let executor = Arc::new(
            ScriptedExecutor::default()
                .with(ProviderName::Groq, Err("limite"))
                .with(ProviderName::Gemini, Err("SAFETY"))
                .with(ProviderName::OpenAI, Ok("resposta")),
        );
        let result = chain(executor.clone(), &THREE)
            .generate(&UserContent::from("x"), "sys")
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderName::OpenAI);
        assert_eq!(
            crate::providers::join_failures(&result.fallbacks),
            "Groq: limite | Gemini: SAFETY"
        );
        assert_eq!(executor.calls(), THREE.to_vec());
    }

    #[tokio::test]
    async fn test_exhausted_chain_aggregates_in_order() {
        let executor = Arc::new(
            ScriptedExecutor::default()
                .with(ProviderName::Gemini, Err("quota"))
                .with(ProviderName::OpenAI, Err("invalid key")),
        );
        let failure = chain(executor, &[ProviderName::Gemini, ProviderName::OpenAI])
            .generate(&UserContent::from("x"), "sys")
            .await
            .unwrap_err();

        assert_eq!(failure.to_string(), "Gemini: quota | OpenAI: invalid key");
        assert_eq!(failure.failures.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_provider_times_out_and_falls_back() {
        let executor = Arc::new(
            ScriptedExecutor::default()
                .with(ProviderName::Gemini, Ok("tarde demais"))
                .delayed(ProviderName::Gemini, Duration::from_secs(600))
                .with(ProviderName::OpenAI, Ok("a tempo")),
        );
        let chain = ProviderChain::builder()
            .provider(Box::new(StubProvider(ProviderName::Gemini)))
            .provider(Box::new(StubProvider(ProviderName::OpenAI)))
            .executor(executor.clone())
            .attempt_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let result = chain.generate(&UserContent::from("x"), "sys").await.unwrap();
        assert_eq!(result.provider, ProviderName::OpenAI);
        assert_eq!(result.fallbacks[0].message, "Tempo limite excedido após 5000ms");
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let result = ProviderChain::builder()
            .executor(Arc::new(ScriptedExecutor::default()))
            .build();
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    proptest! {
        #[test]
        fn prop_aggregate_lists_each_provider_once_in_order(
            messages in proptest::collection::vec("[a-zA-Z0-9 ]{1,24}", 3)
        ) {
            let executor = Arc::new(
                ScriptedExecutor::default()
                    .with(ProviderName::Groq, Err(messages[0].as_str()))
                    .with(ProviderName::Gemini, Err(messages[1].as_str()))
                    .with(ProviderName::OpenAI, Err(messages[2].as_str())),
            );
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let failure = runtime
                .block_on(chain(executor, &THREE).generate(&UserContent::from("x"), "sys"))
                .unwrap_err();

            let expected = format!(
                "Groq: {} | Gemini: {} | OpenAI: {}",
                messages[0], messages[1], messages[2]
            );
            prop_assert_eq!(failure.to_string(), expected);
        }
    }
}
