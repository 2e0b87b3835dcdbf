//! Configuration schema structures with serde support

use super::env;
use super::error::{ConfigError, ValidationError};
use super::secrets::SecretString;
use crate::content::ProviderName;
use crate::providers::{ClassificationMode, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Shared secret used by the panel when `PAINEL_SENHA` is not set
pub const DEFAULT_PANEL_PASSWORD: &str = "smed2025";

/// Root configuration structure for the gateway
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Which providers are tried, and in what order
    #[serde(default)]
    pub chain: ChainConfig,

    /// Per-provider credentials and overrides
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Consultation panel datastore and shared secret
    #[serde(default)]
    pub panel: PanelConfig,

    /// Global connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted request body; images arrive base64-encoded
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Stock provider chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainVariant {
    /// Gemini, then OpenAI
    #[default]
    TwoProvider,
    /// Groq, then Gemini (hardened), then OpenAI
    ThreeProvider,
}

impl ChainVariant {
    pub fn default_order(&self) -> Vec<ProviderName> {
        match self {
            Self::TwoProvider => vec![ProviderName::Gemini, ProviderName::OpenAI],
            Self::ThreeProvider => {
                vec![ProviderName::Groq, ProviderName::Gemini, ProviderName::OpenAI]
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoProvider => "two_provider",
            Self::ThreeProvider => "three_provider",
        }
    }
}

impl FromStr for ChainVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "two_provider" | "2" => Ok(Self::TwoProvider),
            "three_provider" | "3" => Ok(Self::ThreeProvider),
            other => Err(ConfigError::Invalid {
                message: format!(
                    "unknown chain variant '{other}' (expected two_provider or three_provider)"
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    #[serde(default)]
    pub variant: ChainVariant,

    /// Explicit attempt order; overrides `variant` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<ProviderName>>,

    /// Upper bound for a single provider attempt
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            variant: ChainVariant::default(),
            order: None,
            attempt_timeout_ms: default_attempt_timeout(),
        }
    }
}

impl ChainConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Providers in attempt order
    pub fn resolved_order(&self) -> Vec<ProviderName> {
        self.order
            .clone()
            .unwrap_or_else(|| self.variant.default_order())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub groq: ProviderSettings,
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub openai: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, name: ProviderName) -> &ProviderSettings {
        match name {
            ProviderName::Groq => &self.groq,
            ProviderName::Gemini => &self.gemini,
            ProviderName::OpenAI => &self.openai,
        }
    }
}

/// Credential plus optional overrides of the stock adapter settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// API key (supports environment variable interpolation)
    #[serde(default)]
    pub api_key: SecretString,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Output-token cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationMode>,
}

impl ProviderSettings {
    pub fn with_api_key(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Layer these settings over the stock ones for `name`
    fn resolve(&self, name: ProviderName, fallback_mode: ClassificationMode) -> ProviderConfig {
        let defaults = ProviderConfig::defaults_for(name);
        ProviderConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            model: self.model.clone().unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            classification: self.classification.unwrap_or(fallback_mode),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PanelConfig {
    /// PostgREST base URL of the consultation store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    #[serde(default)]
    pub store_key: SecretString,

    /// Shared secret required to read the panel
    #[serde(default = "default_panel_password")]
    pub password: SecretString,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: SecretString::default(),
            password: default_panel_password(),
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

// Default value functions for serde
fn default_bind() -> String { "0.0.0.0:3000".to_string() }
fn default_max_body_bytes() -> usize { 20 * 1024 * 1024 }
fn default_attempt_timeout() -> u64 { 60_000 }
fn default_connect_timeout() -> u64 { 10_000 }
fn default_panel_password() -> SecretString { SecretString::new(DEFAULT_PANEL_PASSWORD) }

impl GatewayConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(variant) = env::var("AI_CHAIN") {
            config.chain.variant = variant.parse()?;
        }
        if let Some(ms) = env::var("ATTEMPT_TIMEOUT_MS") {
            config.chain.attempt_timeout_ms = ms.trim().parse().map_err(|_| {
                ConfigError::Validation(ValidationError::invalid_value(
                    "ATTEMPT_TIMEOUT_MS",
                    "milliseconds",
                    ms.clone(),
                ))
            })?;
        }

        config.providers.groq.api_key = env::var_or("GROQ_API_KEY", "").into();
        config.providers.gemini.api_key = env::var_or("GEMINI_API_KEY", "").into();
        config.providers.openai.api_key = env::var_or("OPENAI_API_KEY", "").into();

        config.panel.store_url = env::var("SUPABASE_URL");
        config.panel.store_key = env::var_or("SUPABASE_KEY", "").into();
        config.panel.password = env::var_or("PAINEL_SENHA", DEFAULT_PANEL_PASSWORD).into();

        super::ConfigValidator::new().validate(&config)?;
        Ok(config)
    }

    /// Resolved adapter settings, in attempt order.
    ///
    /// The three-provider chain reads Gemini with hardened classification
    /// unless the Gemini section says otherwise.
    pub fn chain_providers(&self) -> Vec<(ProviderName, ProviderConfig)> {
        let three = self.chain.order.is_none() && self.chain.variant == ChainVariant::ThreeProvider;
        self.chain
            .resolved_order()
            .into_iter()
            .map(|name| {
                let fallback_mode = match name {
                    ProviderName::Gemini if three => ClassificationMode::Hardened,
                    _ => ProviderConfig::defaults_for(name).classification,
                };
                (name, self.providers.get(name).resolve(name, fallback_mode))
            })
            .collect()
    }

    /// Validate field-local constraints
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::invalid_value(
                "server.bind",
                "socket address (host:port)",
                self.server.bind.clone(),
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ValidationError::out_of_range(
                "server.max_body_bytes",
                "Must be greater than 0",
            ));
        }
        if self.chain.attempt_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                "chain.attempt_timeout_ms",
                "Must be greater than 0",
            ));
        }
        if self.connection.connect_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                "connection.connect_timeout_ms",
                "Must be greater than 0",
            ));
        }

        for name in [ProviderName::Groq, ProviderName::Gemini, ProviderName::OpenAI] {
            self.providers
                .get(name)
                .validate(&format!("providers.{}", name.as_str()))?;
        }

        if let Some(store_url) = &self.panel.store_url {
            validate_http_url("panel.store_url", store_url)?;
        }

        Ok(())
    }
}

impl ProviderSettings {
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if let Some(base_url) = &self.base_url {
            validate_http_url(&format!("{path}.base_url"), base_url)?;
        }
        if matches!(self.model.as_deref(), Some(model) if model.trim().is_empty()) {
            return Err(ValidationError::required(format!("{path}.model")));
        }
        if self.max_tokens == Some(0) {
            return Err(ValidationError::out_of_range(
                format!("{path}.max_tokens"),
                "Must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Proper URL validation using the url crate, http or https only
fn validate_http_url(path: &str, value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        Ok(url) => Err(ValidationError::invalid_url(
            path,
            format!("URL scheme must be http or https, got: {}", url.scheme()),
        )),
        Err(e) => Err(ValidationError::invalid_url(path, e.to_string())),
    }
}
