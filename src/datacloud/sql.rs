//! Query Service SQL construction.
//!
//! All user-controlled text that ends up in Query Service SQL passes through
//! this module: object names are checked with [`validate_identifier`] and the
//! search text is quoted with [`escape_literal`].

use super::QueryRequest;
use crate::error::{Error, Result};

/// Record id column shared by the vector index and chunk objects.
pub const RECORD_ID_COLUMN: &str = "RecordId__c";
/// Similarity score column produced by `vector_search`.
pub const SCORE_COLUMN: &str = "score__c";
/// Chunk text column of the chunk object.
pub const CHUNK_COLUMN: &str = "Chunk__c";

/// Check that `name` can be spliced into SQL as a bare identifier.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid SQL identifier: {name:?}")))
    }
}

/// Quote `text` as a single-quoted SQL string literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\0' => {}
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// A `vector_search` over the index object joined back to the chunk text.
#[derive(Debug, Clone)]
pub struct VectorSearchQuery<'a> {
    pub vector_index: &'a str,
    pub chunk: &'a str,
    pub query_text: &'a str,
    pub limit: usize,
}

impl VectorSearchQuery<'_> {
    pub fn to_sql(&self) -> Result<String> {
        validate_identifier(self.vector_index)?;
        validate_identifier(self.chunk)?;

        let index = self.vector_index;
        let chunk = self.chunk;
        let text = escape_literal(self.query_text);
        let limit = self.limit;

        Ok(format!(
            "SELECT index.{RECORD_ID_COLUMN}, index.{SCORE_COLUMN}, chunk.{CHUNK_COLUMN} \
             FROM vector_search(TABLE({index}), {text}, '', {limit}) AS index \
             JOIN {chunk} AS chunk \
             ON index.{RECORD_ID_COLUMN} = chunk.{RECORD_ID_COLUMN}"
        ))
    }

    pub fn to_request(&self) -> Result<QueryRequest> {
        Ok(QueryRequest { sql: self.to_sql()? })
    }
}
