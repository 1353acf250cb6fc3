use crate::config::AppConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod providers;

pub use providers::datacloud::DataCloudMemoryStore;

/// Free-form metadata attached to a memory. The text lives under `data`.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Metadata filters passed through by the memory library.
pub type Filters = serde_json::Map<String, serde_json::Value>;

/// Payload key holding the memory text.
pub const PAYLOAD_DATA_KEY: &str = "data";

/// A single search or listing hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    /// Memory id.
    pub id: Option<String>,
    /// Distance or score as ranked by the backend.
    pub score: Option<f64>,
    /// Memory metadata, with the text under `data`.
    pub payload: Option<Payload>,
}

/// Static description of the objects a store reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub connector_name: String,
    pub vector_index_name: String,
    pub chunk_name: String,
}

#[async_trait]
pub trait VectorStore: Send + Sync + std::fmt::Debug {
    /// Create a collection for vectors of `vector_size` using `distance`.
    async fn create_collection(&self, name: &str, vector_size: usize, distance: &str)
    -> Result<()>;

    /// Insert memories, returning the ids that were written.
    async fn insert(
        &self,
        vectors: &[Vec<f32>],
        payloads: &[Payload],
        ids: Option<&[String]>,
    ) -> Result<Vec<String>>;

    /// Search for the `limit` memories closest to `query`.
    async fn search(
        &self,
        query: &str,
        vectors: &[Vec<f32>],
        limit: usize,
        filters: Option<&Filters>,
    ) -> Result<Vec<OutputData>>;

    /// Delete a memory. Returns whether anything was deleted.
    async fn delete(&self, vector_id: &str) -> Result<bool>;

    /// Update a memory's vector and/or payload. Returns whether anything changed.
    async fn update(
        &self,
        vector_id: &str,
        vector: Option<&[f32]>,
        payload: Option<&Payload>,
    ) -> Result<bool>;

    /// Fetch a memory by id.
    async fn get(&self, vector_id: &str) -> Result<Option<OutputData>>;

    /// List collection names.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Drop the collection. Returns whether anything was dropped.
    async fn delete_collection(&self) -> Result<bool>;

    /// Describe the collection.
    async fn collection_info(&self) -> Result<CollectionInfo>;

    /// List memories matching `filters`.
    async fn list(&self, filters: Option<&Filters>, limit: Option<usize>)
    -> Result<Vec<OutputData>>;

    /// Remove every memory. Returns whether anything was removed.
    async fn reset(&self) -> Result<bool>;
}

/// Build the vector store selected by `store.provider`.
pub fn create_vector_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>> {
    match config.store.provider.to_lowercase().as_str() {
        "datacloud" | "data_cloud" => Ok(Arc::new(DataCloudMemoryStore::from_config(config)?)),
        other => Err(Error::Config(format!(
            "unknown vector store provider: {other}"
        ))),
    }
}
