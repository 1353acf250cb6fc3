//! Data Cloud backed memory store.
//!
//! Writes go over the Ingestion API and reads over the Query Service API.
//! Data Cloud computes embeddings itself in real time, so only the memory
//! text is sent and the caller's vectors are ignored. The target object,
//! vector index and chunk objects are provisioned out of band; the
//! collection-management calls of [`VectorStore`] are therefore no-ops.

use crate::config::{AppConfig, StoreSettings};
use crate::datacloud::sql::{self, VectorSearchQuery};
use crate::datacloud::{
    IngestBatch, IngestionApi, IngestionClient, MemoryRecord, QueryApi, QueryRow,
    QueryServiceClient,
};
use crate::error::{Error, Result};
use crate::vector_store::{
    CollectionInfo, Filters, OutputData, PAYLOAD_DATA_KEY, Payload, VectorStore,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// `createdAt` format expected by the memory object.
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct DataCloudMemoryStore {
    settings: StoreSettings,
    ingestion: Arc<dyn IngestionApi>,
    query: Arc<dyn QueryApi>,
}

impl DataCloudMemoryStore {
    /// Create a store over the given collaborators.
    ///
    /// No request is made here; the objects named in `settings` are assumed to
    /// exist already.
    pub fn new(
        settings: StoreSettings,
        ingestion: Arc<dyn IngestionApi>,
        query: Arc<dyn QueryApi>,
    ) -> Result<Self> {
        for (key, name) in [
            ("store.connector_name", &settings.connector_name),
            ("store.object_name", &settings.object_name),
        ] {
            if name.trim().is_empty() || name.contains('/') {
                return Err(Error::Config(format!("invalid {key}: {name:?}")));
            }
        }
        sql::validate_identifier(&settings.vector_index_name)?;
        sql::validate_identifier(&settings.chunk_name)?;

        Ok(Self {
            settings,
            ingestion,
            query,
        })
    }

    /// Create a store talking to the Data Cloud tenant in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.store.clone(),
            Arc::new(IngestionClient::from_settings(&config.datacloud)?),
            Arc::new(QueryServiceClient::from_settings(&config.datacloud)?),
        )
    }

    fn unsupported(&self, operation: &str) {
        debug!(
            operation,
            object = %self.settings.object_name,
            "Not supported by the Data Cloud memory store, ignoring"
        );
    }
}

/// Extract the memory text of the payload at `index`.
fn memory_text(index: usize, payload: &Payload) -> Result<String> {
    match payload.get(PAYLOAD_DATA_KEY) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(Error::InvalidPayload {
            index,
            reason: format!("`{PAYLOAD_DATA_KEY}` must be a string"),
        }),
        None => Err(Error::InvalidPayload {
            index,
            reason: format!("missing `{PAYLOAD_DATA_KEY}` field"),
        }),
    }
}

/// A row carries no memory when its chunk text is null, blank or the text `null`.
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("null")
        }
        _ => false,
    }
}

fn to_output(row: QueryRow) -> Option<OutputData> {
    if is_empty_payload(&row.payload) {
        return None;
    }
    let mut payload = Payload::new();
    payload.insert(PAYLOAD_DATA_KEY.to_string(), row.payload);
    Some(OutputData {
        id: row.id,
        score: row.score,
        payload: Some(payload),
    })
}

#[async_trait]
impl VectorStore for DataCloudMemoryStore {
    async fn create_collection(
        &self,
        _name: &str,
        _vector_size: usize,
        _distance: &str,
    ) -> Result<()> {
        self.unsupported("create_collection");
        Ok(())
    }

    async fn insert(
        &self,
        _vectors: &[Vec<f32>],
        payloads: &[Payload],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        if payloads.is_empty() {
            warn!("Empty payload, nothing will be inserted");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = match ids {
            Some(ids) if ids.len() != payloads.len() => {
                return Err(Error::InputLengthMismatch {
                    payloads: payloads.len(),
                    ids: ids.len(),
                });
            }
            Some(ids) => ids.to_vec(),
            None => payloads.iter().map(|_| Uuid::new_v4().to_string()).collect(),
        };

        let created_at = chrono::Local::now().format(CREATED_AT_FORMAT).to_string();
        let data = payloads
            .iter()
            .zip(&ids)
            .enumerate()
            .map(|(index, (payload, id))| -> Result<MemoryRecord> {
                Ok(MemoryRecord {
                    id: id.clone(),
                    memory: memory_text(index, payload)?,
                    created_at: created_at.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let batch = IngestBatch { data };
        self.ingestion
            .ingest(
                &batch,
                &self.settings.connector_name,
                &self.settings.object_name,
            )
            .await?;

        info!(
            connector = %self.settings.connector_name,
            object = %self.settings.object_name,
            count = ids.len(),
            "Ingested memories"
        );
        Ok(ids)
    }

    /// Runs one `vector_search` query per call. A `limit` of zero returns no
    /// results without contacting Data Cloud.
    async fn search(
        &self,
        query: &str,
        _vectors: &[Vec<f32>],
        limit: usize,
        filters: Option<&Filters>,
    ) -> Result<Vec<OutputData>> {
        if filters.is_some_and(|f| !f.is_empty()) {
            debug!("Search filters are not supported by Data Cloud vector_search, ignoring");
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let request = VectorSearchQuery {
            vector_index: &self.settings.vector_index_name,
            chunk: &self.settings.chunk_name,
            query_text: query,
            limit,
        }
        .to_request()?;

        let rows = self.query.execute(&request).await?;
        let total = rows.len();
        let results: Vec<OutputData> = rows.into_iter().filter_map(to_output).collect();

        debug!(
            index = %self.settings.vector_index_name,
            limit,
            rows = total,
            results = results.len(),
            "Vector search completed"
        );
        Ok(results)
    }

    async fn delete(&self, _vector_id: &str) -> Result<bool> {
        self.unsupported("delete");
        Ok(false)
    }

    async fn update(
        &self,
        _vector_id: &str,
        _vector: Option<&[f32]>,
        _payload: Option<&Payload>,
    ) -> Result<bool> {
        self.unsupported("update");
        Ok(false)
    }

    async fn get(&self, _vector_id: &str) -> Result<Option<OutputData>> {
        self.unsupported("get");
        Ok(None)
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        Ok(vec![self.settings.object_name.clone()])
    }

    async fn delete_collection(&self) -> Result<bool> {
        self.unsupported("delete_collection");
        Ok(false)
    }

    async fn collection_info(&self) -> Result<CollectionInfo> {
        Ok(CollectionInfo {
            name: self.settings.object_name.clone(),
            connector_name: self.settings.connector_name.clone(),
            vector_index_name: self.settings.vector_index_name.clone(),
            chunk_name: self.settings.chunk_name.clone(),
        })
    }

    async fn list(
        &self,
        _filters: Option<&Filters>,
        _limit: Option<usize>,
    ) -> Result<Vec<OutputData>> {
        self.unsupported("list");
        Ok(Vec::new())
    }

    async fn reset(&self) -> Result<bool> {
        self.unsupported("reset");
        Ok(false)
    }
}

// =============================================================================
// Tests
// =============================================================================
