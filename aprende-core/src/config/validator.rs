//! Configuration validation utilities

use super::error::ValidationError;
use super::schema::GatewayConfig;
use std::collections::HashSet;
use tracing::warn;

/// Configuration validator with cross-section rules
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &GatewayConfig) -> Result<(), ValidationError> {
        // First run the field-local validation
        config.validate()?;

        self.validate_chain_order(config)?;
        self.check_credentials(config);

        Ok(())
    }

    fn validate_chain_order(&self, config: &GatewayConfig) -> Result<(), ValidationError> {
        let Some(order) = &config.chain.order else {
            return Ok(());
        };

        if order.is_empty() {
            return Err(ValidationError::required("chain.order")
                .with_context("At least one provider must be listed"));
        }

        let mut seen = HashSet::new();
        for (i, name) in order.iter().enumerate() {
            if !seen.insert(name) {
                return Err(ValidationError::duplicate(
                    format!("chain.order[{i}]"),
                    name.as_str(),
                ));
            }
        }

        Ok(())
    }

    /// Missing keys are not fatal: the provider answers with an auth error
    /// and the chain falls back.
    fn check_credentials(&self, config: &GatewayConfig) {
        for name in config.chain.resolved_order() {
            if config.providers.get(name).api_key.is_empty() {
                warn!("No API key configured for {}; its attempts will fail", name);
            }
        }
        if config.panel.store_url.is_none() {
            warn!("No consultation store configured; the panel will report store failures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ValidationErrorKind;
    use crate::content::ProviderName;

    #[test]
    fn test_empty_order_is_rejected() {
        let mut config = GatewayConfig::default();
        config.chain.order = Some(vec![]);

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "chain.order");
        assert!(matches!(err.kind, ValidationErrorKind::Missing));
    }

    #[test]
    fn test_duplicate_provider_is_rejected() {
        let mut config = GatewayConfig::default();
        config.chain.order = Some(vec![
            ProviderName::Gemini,
            ProviderName::OpenAI,
            ProviderName::Gemini,
        ]);

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field_path, "chain.order[2]");
        assert!(matches!(
            err.kind,
            ValidationErrorKind::Duplicate(ref value) if value == "gemini"
        ));
    }

    #[test]
    fn test_missing_keys_are_not_fatal() {
        let config = GatewayConfig::default();
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }
}
