//! Query Service API client.

use super::sql::{CHUNK_COLUMN, RECORD_ID_COLUMN, SCORE_COLUMN};
use super::{Connection, QueryApi, QueryRequest, QueryRow};
use crate::config::DataCloudSettings;
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

const QUERY_PATH: &str = "/api/v2/query";

// =============================================================================
// REST API Response Types
// =============================================================================

/// Response from the v2 query endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub metadata: HashMap<String, ColumnMetadata>,
    #[serde(default = "default_done")]
    pub done: bool,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub query_id: Option<String>,
}

fn default_done() -> bool {
    true
}

/// Column description keyed by column name in [`QueryResponse::metadata`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub place_in_order: usize,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

/// Positions of the search columns within a row array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    id: usize,
    score: usize,
    payload: usize,
}

impl ColumnLayout {
    /// Resolve positions from response metadata, defaulting to select-list order.
    fn from_metadata(metadata: &HashMap<String, ColumnMetadata>) -> Self {
        let find = |name: &str, fallback: usize| {
            metadata
                .iter()
                .find(|(key, _)| column_matches(key, name))
                .map_or(fallback, |(_, col)| col.place_in_order)
        };
        Self {
            id: find(RECORD_ID_COLUMN, 0),
            score: find(SCORE_COLUMN, 1),
            payload: find(CHUNK_COLUMN, 2),
        }
    }
}

/// Metadata keys may come back qualified (`index.RecordId__c`) or in any case.
fn column_matches(key: &str, name: &str) -> bool {
    let bare = key.rsplit('.').next().unwrap_or(key);
    bare.eq_ignore_ascii_case(name)
}

fn value_to_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_score(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn object_field<'a>(row: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(key, _)| column_matches(key, name))
        .map(|(_, value)| value)
}

impl QueryResponse {
    /// Map raw rows onto `(id, score, payload)` search rows.
    pub fn into_rows(self) -> Vec<QueryRow> {
        let layout = ColumnLayout::from_metadata(&self.metadata);
        self.data
            .into_iter()
            .filter_map(|row| match row {
                Value::Array(cells) => Some(QueryRow {
                    id: value_to_id(cells.get(layout.id)),
                    score: value_to_score(cells.get(layout.score)),
                    payload: cells.get(layout.payload).cloned().unwrap_or(Value::Null),
                }),
                Value::Object(fields) => Some(QueryRow {
                    id: value_to_id(object_field(&fields, RECORD_ID_COLUMN)),
                    score: value_to_score(object_field(&fields, SCORE_COLUMN)),
                    payload: object_field(&fields, CHUNK_COLUMN)
                        .cloned()
                        .unwrap_or(Value::Null),
                }),
                other => {
                    warn!(row = %other, "Skipping malformed query row");
                    None
                }
            })
            .collect()
    }
}

// =============================================================================
// Query Service Client
// =============================================================================

/// Runs SQL against the Query Service API.
#[derive(Debug, Clone)]
pub struct QueryServiceClient {
    conn: Connection,
}

impl QueryServiceClient {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn from_settings(settings: &DataCloudSettings) -> Result<Self> {
        Ok(Self::new(Connection::from_settings(settings)?))
    }
}

#[async_trait]
impl QueryApi for QueryServiceClient {
    async fn execute(&self, request: &QueryRequest) -> Result<Vec<QueryRow>> {
        let url = self.conn.url(QUERY_PATH)?;
        debug!(sql = %request.sql, "Executing query");

        let response = self.conn.post(url).json(request).send().await?;
        let body: QueryResponse = Connection::handle_response(response).await?;

        if !body.done {
            warn!(
                query_id = body.query_id.as_deref().unwrap_or_default(),
                row_count = body.row_count,
                "Query returned more than one batch, only the first is used"
            );
        }

        let rows = body.into_rows();
        debug!(rows = rows.len(), "Query completed");
        Ok(rows)
    }
}
