//! In-memory fake of the RAG service for unit and integration tests
//!
//! [`FakeRagClient`] implements [`RagApi`] without any network I/O. It keeps a
//! document list, answers chat queries from a script (falling back to an echo
//! answer), can be told to fail specific operations, and counts every call so
//! tests can assert on exactly which requests were issued.
//!
//! # Example
//!
//! ```
//! use docubot::client::{ChatReply, FakeRagClient, RagApi};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fake = FakeRagClient::new();
//! fake.push_reply(ChatReply::new("Paris", vec!["atlas.pdf".to_string()]));
//!
//! let reply = fake.send_chat("Capital of France?").await.unwrap();
//! assert_eq!(reply.answer, "Paris");
//! assert_eq!(fake.calls().chat, 1);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::types::{ChatReply, Document, IngestReceipt};
use crate::client::RagApi;
use crate::error::{ClientResult, DocubotError};

/// Number of calls received per endpoint
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub chat: usize,
    pub ingest: usize,
    pub list: usize,
    pub delete: usize,
}

impl CallCounts {
    /// Total number of requests across all endpoints
    pub fn total(&self) -> usize {
        self.chat + self.ingest + self.list + self.delete
    }
}

#[derive(Debug, Default)]
struct FakeState {
    documents: Vec<Document>,
    replies: VecDeque<ClientResult<ChatReply>>,
    queries: Vec<String>,
    ingest_failure: Option<String>,
    list_failure: Option<String>,
    calls: CallCounts,
    next_id: usize,
}

/// In-process stand-in for the RAG service
#[derive(Debug, Default)]
pub struct FakeRagClient {
    state: Mutex<FakeState>,
}

impl FakeRagClient {
    /// Create an empty fake service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake service that already knows the given documents
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let fake = Self::new();
        {
            let mut state = fake.lock();
            state.next_id = documents.len();
            state.documents = documents;
        }
        fake
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a successful chat reply
    pub fn push_reply(&self, reply: ChatReply) {
        self.lock().replies.push_back(Ok(reply));
    }

    /// Queue a failed chat reply
    pub fn push_chat_error(&self, error: DocubotError) {
        self.lock().replies.push_back(Err(error));
    }

    /// Make every ingest fail with the given message until cleared
    pub fn fail_ingest(&self, message: impl Into<String>) {
        self.lock().ingest_failure = Some(message.into());
    }

    /// Make every listing fail with the given message until cleared
    pub fn fail_list(&self, message: impl Into<String>) {
        self.lock().list_failure = Some(message.into());
    }

    /// Clear any configured ingest or listing failure
    pub fn clear_failures(&self) {
        let mut state = self.lock();
        state.ingest_failure = None;
        state.list_failure = None;
    }

    /// Calls received so far
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Queries received by the chat endpoint, in order
    pub fn queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// Documents currently held by the fake service
    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }
}

#[async_trait]
impl RagApi for FakeRagClient {
    async fn send_chat(&self, query: &str) -> ClientResult<ChatReply> {
        let mut state = self.lock();
        state.calls.chat += 1;
        state.queries.push(query.to_string());
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::new(format!("Echo: {}", query), Vec::new())))
    }

    async fn ingest_document(&self, bytes: Vec<u8>, filename: &str) -> ClientResult<IngestReceipt> {
        let mut state = self.lock();
        state.calls.ingest += 1;
        if let Some(message) = &state.ingest_failure {
            return Err(DocubotError::Upload(message.clone()));
        }

        state.next_id += 1;
        let id = format!("doc-{}", state.next_id);
        state.documents.push(Document::new(id.clone(), filename));
        Ok(IngestReceipt {
            id: Some(id),
            filename: filename.to_string(),
            message: "Ingest successfully!".to_string(),
            chunks_count: Some(bytes.len() / 1000 + 1),
        })
    }

    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        let mut state = self.lock();
        state.calls.list += 1;
        if let Some(message) = &state.list_failure {
            return Err(DocubotError::Fetch(message.clone()));
        }
        Ok(state.documents.clone())
    }

    async fn delete_document(&self, id: &str) -> ClientResult<()> {
        let mut state = self.lock();
        state.calls.delete += 1;
        state.documents.retain(|doc| doc.id != id);
        Ok(())
    }
}
