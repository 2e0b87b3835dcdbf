//! Consultation panel
//!
//! Teachers' consultations are logged with a `POST` and read back, behind a
//! shared secret, with a `GET`. Storage is delegated to a
//! [`ConsultationStore`].

pub mod store;

pub use store::{ConsultationStore, RestConsultationStore};

use crate::config::{ConfigError, ConnectionConfig, PanelConfig, SecretString};
use crate::handler::HandlerResponse;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("Método não permitido")]
    MethodNotAllowed,

    #[error("Senha incorreta")]
    Unauthorized,

    #[error("Dados inválidos")]
    InvalidData,

    #[error("Banco de consultas não configurado")]
    NotConfigured,

    #[error("Falha no banco de consultas: {message}")]
    Store { message: String },
}

impl PanelError {
    pub fn store(err: impl fmt::Display) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidData => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Store { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<PanelError> for HandlerResponse {
    fn from(err: PanelError) -> Self {
        Self::error(err.status_code(), err.to_string())
    }
}

/// One logged consultation. Fields are forwarded as sent; absent ones are
/// left out of the stored row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub componente: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ano: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagina: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursos: Option<Value>,
}

impl Consultation {
    /// `componente` and `ano` must both carry a value
    pub fn is_valid(&self) -> bool {
        is_present(self.componente.as_ref()) && is_present(self.ano.as_ref())
    }
}

/// False for missing, `null`, `false`, `0` and `""`
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Password-gated read-back and consultation logging
#[derive(Clone)]
pub struct PanelHandler {
    store: Option<Arc<dyn ConsultationStore>>,
    password: SecretString,
}

impl PanelHandler {
    pub fn new(store: Option<Arc<dyn ConsultationStore>>, password: SecretString) -> Self {
        Self { store, password }
    }

    /// REST-backed handler; without a `store_url` every store call fails
    pub fn from_config(
        panel: &PanelConfig,
        connection: &ConnectionConfig,
    ) -> Result<Self, ConfigError> {
        let store = match &panel.store_url {
            Some(url) => Some(Arc::new(RestConsultationStore::new(
                url.clone(),
                panel.store_key.clone(),
                connection.connect_timeout(),
            )?) as Arc<dyn ConsultationStore>),
            None => None,
        };
        Ok(Self::new(store, panel.password.clone()))
    }

    fn store(&self) -> Result<&dyn ConsultationStore, PanelError> {
        self.store.as_deref().ok_or(PanelError::NotConfigured)
    }

    /// Handle one raw request. `senha` is the query-string password.
    pub async fn handle(&self, method: &Method, senha: Option<&str>, body: &[u8]) -> HandlerResponse {
        match *method {
            Method::GET => match self.list(senha).await {
                Ok(rows) => HandlerResponse::new(StatusCode::OK, rows),
                Err(err) => err.into(),
            },
            Method::POST => match self.record(body).await {
                Ok(ok) => {
                    let status = if ok {
                        StatusCode::OK
                    } else {
                        StatusCode::INTERNAL_SERVER_ERROR
                    };
                    HandlerResponse::new(status, json!({ "ok": ok }))
                }
                Err(err) => err.into(),
            },
            _ => PanelError::MethodNotAllowed.into(),
        }
    }

    /// Latest consultations, if `senha` matches the shared secret
    pub async fn list(&self, senha: Option<&str>) -> Result<Value, PanelError> {
        match senha {
            Some(candidate) if self.password.matches(candidate) => {}
            _ => return Err(PanelError::Unauthorized),
        }
        self.store()?.recent().await.inspect_err(|e| {
            error!("Panel read failed: {}", e);
        })
    }

    /// Validate and store a consultation.
    ///
    /// Store failures become `Ok(false)`; only invalid input is an error.
    pub async fn record(&self, body: &[u8]) -> Result<bool, PanelError> {
        let consultation: Consultation =
            serde_json::from_slice(body).map_err(|_| PanelError::InvalidData)?;
        if !consultation.is_valid() {
            return Err(PanelError::InvalidData);
        }

        let outcome = match self.store() {
            Ok(store) => store.insert(&consultation).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(ok) => {
                info!("Consultation recorded: {}", ok);
                Ok(ok)
            }
            Err(err) => {
                error!("Panel insert failed: {}", err);
                Ok(false)
            }
        }
    }
}
