//! Aprende Core Library
//!
//! Multi-provider generation for the Aprende Mais pedagogical assistant: a
//! request is normalized for each provider's wire format and sent down an
//! ordered fallback chain until one provider answers.

pub mod config;
pub mod content;
pub mod handler;
pub mod http;
pub mod normalize;
pub mod panel;
pub mod providers;

pub use config::{GatewayConfig, SecretString};
pub use content::{ContentPart, GenerationRequest, GenerationResult, ProviderName, UserContent};
pub use handler::{GenerateError, GenerateHandler, HandlerResponse};
pub use panel::PanelHandler;
pub use providers::{AggregateFailure, ProviderChain};

/// Returns the version of the Aprende Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
