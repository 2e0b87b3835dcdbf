//! Consultation store backed by a PostgREST endpoint

use super::{Consultation, PanelError};
use crate::config::{ConfigError, SecretString};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Columns returned by [`ConsultationStore::recent`]
const RECENT_COLUMNS: &str = "componente,ano,volume,created_at,recursos";

/// Rows returned by [`ConsultationStore::recent`]
pub const RECENT_LIMIT: usize = 1000;

/// Where consultations are kept
#[async_trait]
pub trait ConsultationStore: Send + Sync {
    /// Latest consultations, newest first, as returned by the store
    async fn recent(&self) -> Result<Value, PanelError>;

    /// Record one consultation. `Ok(false)` means the store answered with a
    /// non-success status.
    async fn insert(&self, consultation: &Consultation) -> Result<bool, PanelError>;
}

/// PostgREST (`/rest/v1/consultas`) store
pub struct RestConsultationStore {
    client: Client,
    base_url: String,
    key: SecretString,
}

impl RestConsultationStore {
    pub fn new(
        base_url: impl Into<String>,
        key: SecretString,
        connect_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/consultas", self.base_url)
    }

    fn recent_url(&self) -> String {
        format!(
            "{}?select={}&order=created_at.desc&limit={}",
            self.table_url(),
            RECENT_COLUMNS,
            RECENT_LIMIT
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.key.expose_secret())
            .header(
                "Authorization",
                format!("Bearer {}", self.key.expose_secret()),
            )
    }
}

#[async_trait]
impl ConsultationStore for RestConsultationStore {
    async fn recent(&self) -> Result<Value, PanelError> {
        debug!("Fetching consultations from {}", self.table_url());
        let response = self
            .authorized(self.client.get(self.recent_url()))
            .send()
            .await
            .map_err(PanelError::store)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Consultation store answered HTTP {}", status.as_u16());
        }
        response.json::<Value>().await.map_err(PanelError::store)
    }

    async fn insert(&self, consultation: &Consultation) -> Result<bool, PanelError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(consultation)
            .send()
            .await
            .map_err(PanelError::store)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Consultation insert rejected with HTTP {}", status.as_u16());
        }
        Ok(status.is_success())
    }
}
