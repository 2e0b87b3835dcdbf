//! HTTP surface for the Aprende Mais generation gateway
//!
//! Two routes, each accepting any method so the handlers can answer 405
//! themselves with the JSON body clients expect:
//!
//! - `/api/generate`: [`GenerateHandler`]
//! - `/api/painel`: [`PanelHandler`]

use aprende_core::config::{ConfigError, GatewayConfig};
use aprende_core::{GenerateHandler, HandlerResponse, PanelHandler, ProviderChain};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::Method;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::any;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub generate: GenerateHandler,
    pub panel: PanelHandler,
}

impl AppState {
    pub fn new(generate: GenerateHandler, panel: PanelHandler) -> Self {
        Self { generate, panel }
    }

    /// Build both handlers from a loaded configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let chain = ProviderChain::from_config(config)?;
        let panel = PanelHandler::from_config(&config.panel, &config.connection)?;
        Ok(Self::new(GenerateHandler::new(Arc::new(chain)), panel))
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/generate", any(generate))
        .route("/api/painel", any(painel))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

fn respond(response: HandlerResponse) -> Response {
    (response.status, Json(response.body)).into_response()
}

async fn generate(State(state): State<AppState>, method: Method, body: Bytes) -> Response {
    respond(state.generate.handle(&method, &body).await)
}

async fn painel(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let senha = params.get("senha").map(String::as_str);
    respond(state.panel.handle(&method, senha, &body).await)
}
