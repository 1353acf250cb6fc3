//! Data Cloud collaborators.
//!
//! Writes go through the Ingestion API ([`IngestionApi`]) and reads go through
//! the Query Service API ([`QueryApi`]). Both are traits so the memory store
//! can be driven by test doubles; [`ingestion::IngestionClient`] and
//! [`query::QueryServiceClient`] are the HTTP implementations.

use crate::config::DataCloudSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

pub mod ingestion;
pub mod query;
pub mod sql;

pub use ingestion::IngestionClient;
pub use query::QueryServiceClient;

// =============================================================================
// Wire types
// =============================================================================

/// One memory as written to the target data lake object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    pub memory: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Envelope accepted by the streaming ingestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestBatch {
    pub data: Vec<MemoryRecord>,
}

/// Body of a Query Service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

/// A search row as returned by the read collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub id: Option<String>,
    pub score: Option<f64>,
    pub payload: serde_json::Value,
}

// =============================================================================
// Collaborator contracts
// =============================================================================

/// Submits record batches to an ingestion connector.
#[async_trait]
pub trait IngestionApi: Send + Sync + std::fmt::Debug {
    async fn ingest(&self, batch: &IngestBatch, connector_name: &str, object_name: &str)
    -> Result<()>;
}

/// Executes Query Service SQL and returns search rows.
#[async_trait]
pub trait QueryApi: Send + Sync + std::fmt::Debug {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<QueryRow>>;
}

// =============================================================================
// Shared HTTP plumbing
// =============================================================================

/// Authenticated connection to a Data Cloud tenant.
#[derive(Clone)]
pub struct Connection {
    base_url: Url,
    access_token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Connection {
    /// Build a connection from validated settings.
    pub fn from_settings(settings: &DataCloudSettings) -> Result<Self> {
        let base_url = settings.validate()?;
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            base_url,
            access_token: settings.access_token.trim().to_string(),
            http,
        })
    }

    /// Create a connection with a custom reqwest client.
    pub fn with_client(
        base_url: impl AsRef<str>,
        access_token: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            access_token: access_token.into(),
            http,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Turn a non-2xx response into [`Error::Api`], keeping the body as message.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
