//! Streaming Ingestion API client.

use super::{Connection, IngestBatch, IngestionApi};
use crate::config::DataCloudSettings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const INGEST_SOURCES_PATH: &str = "/api/v1/ingest/sources";

/// Writes record batches through an Ingestion API connector.
#[derive(Debug, Clone)]
pub struct IngestionClient {
    conn: Connection,
}

impl IngestionClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn from_settings(settings: &DataCloudSettings) -> Result<Self> {
        Ok(Self::new(Connection::from_settings(settings)?))
    }

    /// `{instance}/api/v1/ingest/sources/{connector}/{object}`
    fn endpoint(&self, connector_name: &str, object_name: &str) -> Result<Url> {
        let mut url = self.conn.url(INGEST_SOURCES_PATH)?;
        url.path_segments_mut()
            .map_err(|()| Error::Config("instance URL cannot be a base".to_string()))?
            .push(connector_name)
            .push(object_name);
        Ok(url)
    }
}

#[async_trait]
impl IngestionApi for IngestionClient {
    async fn ingest(
        &self,
        batch: &IngestBatch,
        connector_name: &str,
        object_name: &str,
    ) -> Result<()> {
        let url = self.endpoint(connector_name, object_name)?;
        debug!(%url, records = batch.data.len(), "Submitting ingestion batch");

        let response = self.conn.post(url).json(batch).send().await?;
        Connection::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let conn = Connection::with_client(
            "https://tenant.c360a.salesforce.com",
            "tok",
            reqwest::Client::new(),
        )
        .unwrap();
        let client = IngestionClient::new(conn);
        let url = client.endpoint("mem0", "AgentMemory").unwrap();
        assert_eq!(
            url.as_str(),
            "https://tenant.c360a.salesforce.com/api/v1/ingest/sources/mem0/AgentMemory"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let conn =
            Connection::with_client("https://tenant.example", "tok", reqwest::Client::new())
                .unwrap();
        let url = IngestionClient::new(conn)
            .endpoint("my connector", "AgentMemory")
            .unwrap();
        assert!(url.path().ends_with("/my%20connector/AgentMemory"));
    }
}
