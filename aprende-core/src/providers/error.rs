//! Provider error types and failure aggregation

use crate::content::ProviderName;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for a single provider attempt
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Why a single provider attempt did not produce text.
///
/// `Display` renders the message that ends up in the aggregated error string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered, and its answer was classified as a failure
    #[error("{message}")]
    Rejected { message: String },

    /// The attempt exceeded the per-attempt time budget
    #[error("Tempo limite excedido após {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// Connection or transport failure before a response was read
    #[error("Falha de rede: {message}")]
    Network { message: String },
}

impl ProviderError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // the request URL may carry a query-string credential
        let err = err.without_url();
        if err.is_connect() {
            ProviderError::Network {
                message: format!("conexão recusada ({})", err),
            }
        } else {
            ProviderError::Network {
                message: err.to_string(),
            }
        }
    }
}

/// One failed attempt, recorded in attempt order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderName,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(provider: ProviderName, error: &ProviderError) -> Self {
        Self {
            provider,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider.display_name(), self.message)
    }
}

/// Render failures as `"A: msg | B: msg"`
pub fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Every provider in the chain failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_failures(.failures))]
pub struct AggregateFailure {
    pub failures: Vec<ProviderFailure>,
}
