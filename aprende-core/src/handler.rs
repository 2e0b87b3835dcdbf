//! Generation endpoint logic
//!
//! [`GenerateHandler`] is transport-agnostic: it takes a method and raw body
//! bytes and returns a status plus JSON body. The server crate only adapts
//! axum's types to it.

use crate::content::{GenerationRequest, GenerationResult};
use crate::providers::{AggregateFailure, ProviderChain};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Why a generation request did not produce text
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Método não permitido")]
    MethodNotAllowed,

    #[error("Parâmetros inválidos")]
    InvalidParameters,

    /// Every provider failed; `Display` lists them in attempt order
    #[error(transparent)]
    AllProvidersFailed(#[from] AggregateFailure),
}

impl GenerateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidParameters => StatusCode::BAD_REQUEST,
            Self::AllProvidersFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Status code and JSON body for the caller
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl HandlerResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `{"error": message}` with the given status
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }
}

impl From<GenerateError> for HandlerResponse {
    fn from(err: GenerateError) -> Self {
        Self::error(err.status_code(), err.to_string())
    }
}

/// Validates requests and runs them through the provider chain
#[derive(Clone)]
pub struct GenerateHandler {
    chain: Arc<ProviderChain>,
}

impl GenerateHandler {
    pub fn new(chain: Arc<ProviderChain>) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    /// Handle one raw request: method check, body validation, generation
    pub async fn handle(&self, method: &Method, body: &[u8]) -> HandlerResponse {
        match self.process(method, body).await {
            Ok(result) => HandlerResponse::new(
                StatusCode::OK,
                json!({ "text": result.text, "provider": result.provider }),
            ),
            Err(err) => err.into(),
        }
    }

    async fn process(&self, method: &Method, body: &[u8]) -> Result<GenerationResult, GenerateError> {
        if *method != Method::POST {
            return Err(GenerateError::MethodNotAllowed);
        }
        let request = GenerationRequest::from_json(body).ok_or(GenerateError::InvalidParameters)?;
        self.generate(&request).await
    }

    /// Run a typed request through the chain
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerateError> {
        if request.user_content.is_empty() || request.system_prompt.is_empty() {
            return Err(GenerateError::InvalidParameters);
        }

        self.chain
            .generate(&request.user_content, &request.system_prompt)
            .await
            .map_err(|failure| {
                error!("All providers failed: {}", failure);
                failure.into()
            })
    }
}
