//! Client adapters for the RAG service
//!
//! This module contains the [`RagApi`] abstraction over the four service
//! endpoints, the reqwest-backed [`HttpRagClient`], and the in-memory
//! [`FakeRagClient`] used by tests.
//!
//! Every call is a single attempt: no retries, no backoff, no cancellation.

pub mod fake;
pub mod http;
pub mod types;

pub use fake::{CallCounts, FakeRagClient};
pub use http::HttpRagClient;
pub use types::{ChatReply, Document, IngestReceipt};

use crate::config::ServerConfig;
use crate::error::ClientResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations offered by the RAG service
#[async_trait]
pub trait RagApi: Send + Sync {
    /// Ask a question against the ingested documents
    ///
    /// # Errors
    ///
    /// Returns `Network` on transport failure or timeout and `Server` on a
    /// non-2xx response
    async fn send_chat(&self, query: &str) -> ClientResult<ChatReply>;

    /// Upload a PDF for ingestion
    ///
    /// # Errors
    ///
    /// Returns `Upload` on any transport failure or non-2xx response
    async fn ingest_document(&self, bytes: Vec<u8>, filename: &str) -> ClientResult<IngestReceipt>;

    /// Fetch the full list of ingested documents
    ///
    /// # Errors
    ///
    /// Returns `Fetch` on any transport failure or non-2xx response
    async fn list_documents(&self) -> ClientResult<Vec<Document>>;

    /// Remove a document from the service
    ///
    /// Deleting an id the service no longer knows is treated as success.
    ///
    /// # Errors
    ///
    /// Returns `Network` on transport failure and `Server` on any other
    /// non-2xx response
    async fn delete_document(&self, id: &str) -> ClientResult<()>;
}

/// Create the HTTP client for the configured service
///
/// # Errors
///
/// Returns `Config` if the base URL and prefix do not form a valid URL
pub fn create_client(config: &ServerConfig) -> ClientResult<Arc<dyn RagApi>> {
    Ok(Arc::new(HttpRagClient::new(config)?))
}
