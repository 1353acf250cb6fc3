//! Data Cloud memory store
//!
//! A vector store backend for agent memory libraries that keeps memories in
//! Salesforce Data Cloud. Writes go through the Ingestion API, reads go
//! through the Query Service API's `vector_search` table function, and
//! embeddings are computed by Data Cloud itself.
//!
//! # Modules
//!
//! - [`vector_store`]: the [`VectorStore`] plugin contract and the Data Cloud implementation
//! - [`datacloud`]: Ingestion and Query Service clients plus SQL construction
//! - [`config`]: layered configuration (defaults, file, environment, CLI)
//! - [`telemetry`]: tracing subscriber setup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod config;
pub mod datacloud;
pub mod error;
pub mod telemetry;
pub mod vector_store;

pub use error::{Error, Result};
pub use vector_store::{
    CollectionInfo, DataCloudMemoryStore, Filters, OutputData, Payload, VectorStore,
    create_vector_store,
};
