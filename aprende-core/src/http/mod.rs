//! HTTP layer for provider calls
//!
//! This module implements the transport side of an attempt:
//! - Request/response round trip against a [`Provider`]
//! - Per-attempt timeout
//! - Request ID generation for log correlation

pub mod client;
pub mod error;

use crate::content::UserContent;
use crate::providers::adapter::Provider;
use crate::providers::error::ProviderResult;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Default per-attempt timeout
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Options for a single provider attempt
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Unique request ID for correlation
    pub request_id: Uuid,

    /// Upper bound for the whole round trip
    pub timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl RequestOptions {
    /// Create new request options with a generated request ID
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Trait for HTTP executors
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Send one request to `provider` and classify the answer.
    ///
    /// `Ok` carries the trimmed generated text.
    async fn execute(
        &self,
        provider: &dyn Provider,
        content: &UserContent,
        system_prompt: &str,
        options: &RequestOptions,
    ) -> ProviderResult<String>;
}
