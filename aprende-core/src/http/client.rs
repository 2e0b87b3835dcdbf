//! HTTP client implementation using reqwest

use crate::config::ConfigError;
use crate::content::UserContent;
use crate::http::{HttpExecutor, RequestOptions};
use crate::providers::adapter::{Classification, Provider};
use crate::providers::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("aprende-core/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed executor
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Client,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(Duration::from_secs(10))
    }

    /// Create a new HTTP client with a custom connect timeout
    pub fn with_config(connect_timeout: Duration) -> Result<Self, ConfigError> {
        let client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the response body cap
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }

    fn too_large(&self) -> ProviderError {
        ProviderError::rejected(format!(
            "Resposta excede o tamanho máximo ({} bytes)",
            self.max_response_size
        ))
    }

    fn map_send_error(
        err: reqwest::Error,
        provider: &dyn Provider,
        options: &RequestOptions,
    ) -> ProviderError {
        let err = err.without_url();
        if err.is_timeout() {
            warn!(
                "Request timeout for {} [request_id: {}]",
                provider.name(),
                options.request_id
            );
            ProviderError::Timeout {
                after: options.timeout,
            }
        } else {
            error!(
                "Request error for {} [request_id: {}]: {}",
                provider.name(),
                options.request_id,
                err
            );
            ProviderError::from(err)
        }
    }
}

#[async_trait]
impl HttpExecutor for HttpClient {
    async fn execute(
        &self,
        provider: &dyn Provider,
        content: &UserContent,
        system_prompt: &str,
        options: &RequestOptions,
    ) -> ProviderResult<String> {
        let request_id = options.request_id;

        info!(
            "Executing HTTP request to {} [request_id: {}]",
            provider.name(),
            request_id
        );
        debug!("Request URL: {}", provider.log_url());

        let body = serde_json::to_vec(&provider.build_request(content, system_prompt))
            .map_err(|e| {
                ProviderError::rejected(format!("Falha ao serializar a requisição: {}", e))
            })?;

        let mut req_builder = self
            .client
            .post(provider.url())
            .timeout(options.timeout)
            .body(body);
        for (key, value) in provider.headers() {
            req_builder = req_builder.header(key, value);
        }

        let mut response = req_builder
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, provider, options))?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);
        if !status.is_success() {
            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status,
                provider.name(),
                request_id
            );
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_response_size as u64 {
                return Err(self.too_large());
            }
        }

        // chunked bodies carry no length up front
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_send_error(e, provider, options))?
        {
            if body.len() + chunk.len() > self.max_response_size {
                warn!(
                    "Response from {} exceeded {} bytes [request_id: {}]",
                    provider.name(),
                    self.max_response_size,
                    request_id
                );
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }
        let response_text = String::from_utf8_lossy(&body);

        match provider.classify(status, &response_text) {
            Classification::Success(text) => {
                info!(
                    "Request completed successfully for {} [request_id: {}]",
                    provider.name(),
                    request_id
                );
                Ok(text)
            }
            Classification::Failure(message) => Err(ProviderError::Rejected { message }),
        }
    }
}
