//! Wire types exchanged with the RAG service

use serde::{Deserialize, Serialize};

/// A document known to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Server-assigned identifier
    pub id: String,
    /// Original file name supplied at upload
    pub filename: String,
}

impl Document {
    /// Create a document entry
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Natural-language question
    pub query: &'a str,
}

/// Body returned by `POST /chat`
///
/// Only `answer` is required; the remaining fields default when the service
/// omits them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated answer, usually markdown
    pub answer: String,
    /// File names of the documents the answer was drawn from
    #[serde(default)]
    pub sources: Vec<String>,
    /// Topic the service assigned to the conversation
    #[serde(default)]
    pub topic: Option<String>,
    /// Whether the service detected a change of topic with this question
    #[serde(default)]
    pub topic_changed: Option<bool>,
}

impl ChatReply {
    /// Create a reply with an answer and its sources
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::client::ChatReply;
    ///
    /// let reply = ChatReply::new("42", vec!["guide.pdf".to_string()]);
    /// assert_eq!(reply.sources.len(), 1);
    /// assert!(reply.topic.is_none());
    /// ```
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
            topic: None,
            topic_changed: None,
        }
    }

    /// Attach topic information to the reply
    pub fn with_topic(mut self, topic: impl Into<String>, changed: bool) -> Self {
        self.topic = Some(topic.into());
        self.topic_changed = Some(changed);
        self
    }
}

/// Body returned by `POST /ingest`
///
/// Older deployments answer with an empty 2xx body, so every field is
/// optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestReceipt {
    /// Identifier of the new document, when the service reports it
    #[serde(default)]
    pub id: Option<String>,
    /// File name as recorded by the service
    #[serde(default)]
    pub filename: String,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
    /// Number of chunks the document was split into
    #[serde(default)]
    pub chunks_count: Option<usize>,
}

impl IngestReceipt {
    /// Receipt for a service that acknowledged the upload without a body
    pub fn acknowledged(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            message: "Ingested".to_string(),
            ..Default::default()
        }
    }
}

/// Body returned by `GET /files`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DocumentListing {
    pub documents: Vec<Document>,
    #[serde(default)]
    pub count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_reply_minimal_body() {
        let reply: ChatReply = serde_json::from_str(r#"{"answer":"hello"}"#).unwrap();
        assert_eq!(reply.answer, "hello");
        assert!(reply.sources.is_empty());
        assert_eq!(reply.topic_changed, None);
    }

    #[test]
    fn test_chat_reply_full_body() {
        let body = r#"{
            "answer": "See section 3.",
            "sources": ["manual.pdf", "faq.pdf"],
            "topic": "installation",
            "topic_changed": true
        }"#;
        let reply: ChatReply = serde_json::from_str(body).unwrap();
        assert_eq!(reply.sources, vec!["manual.pdf", "faq.pdf"]);
        assert_eq!(reply.topic.as_deref(), Some("installation"));
        assert_eq!(reply.topic_changed, Some(true));
    }

    #[test]
    fn test_chat_request_serializes_query_only() {
        let body = serde_json::to_value(ChatRequest { query: "why?" }).unwrap();
        assert_eq!(body, serde_json::json!({ "query": "why?" }));
    }

    #[test]
    fn test_ingest_receipt_tolerates_missing_fields() {
        let receipt: IngestReceipt =
            serde_json::from_str(r#"{"filename":"a.pdf","message":"ok"}"#).unwrap();
        assert_eq!(receipt.filename, "a.pdf");
        assert_eq!(receipt.id, None);
        assert_eq!(receipt.chunks_count, None);
    }

    #[test]
    fn test_listing_without_count() {
        let listing: DocumentListing =
            serde_json::from_str(r#"{"documents":[{"id":"1","filename":"a.pdf"}]}"#).unwrap();
        assert_eq!(listing.documents, vec![Document::new("1", "a.pdf")]);
        assert_eq!(listing.count, None);
    }
}
