//! Chat session: transcript and in-flight gate
//!
//! A [`ChatSession`] owns the ordered transcript of user and assistant
//! messages plus the `pending` flag that allows at most one chat request in
//! flight. Every completed send attempt appends exactly one assistant
//! message: the service's answer, or the configured fallback text when the
//! request failed.

use crate::client::{ChatReply, RagApi};
use crate::config::ChatConfig;
use crate::error::{ClientResult, DocubotError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of the transcript
///
/// The role is fixed at creation. Sources are only ever present on assistant
/// messages that cite at least one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<String>>,
}

impl Message {
    /// Create a user message
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::session::{Message, Role};
    ///
    /// let message = Message::user("What changed in v2?");
    /// assert_eq!(message.role(), Role::User);
    /// assert!(message.sources().is_empty());
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            sources: None,
        }
    }

    /// Create an assistant message without citations
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: None,
        }
    }

    /// Create an assistant message citing the given documents
    ///
    /// An empty source list is stored as no sources.
    pub fn assistant_with_sources(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            sources: if sources.is_empty() {
                None
            } else {
                Some(sources)
            },
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cited documents, empty when the message has none
    pub fn sources(&self) -> &[String] {
        self.sources.as_deref().unwrap_or(&[])
    }
}

/// Result of a completed send attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The service answered; `topic_changed` reports a new conversation topic
    Answered { topic_changed: bool },
    /// The request failed and the fallback message was appended instead
    Degraded { reason: String },
}

/// Ordered transcript plus the single in-flight request gate
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<Message>,
    pending: bool,
    topic: Option<String>,
    fallback_message: String,
}

impl ChatSession {
    /// Create an empty session using the given fallback text for failed requests
    pub fn new(fallback_message: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            pending: false,
            topic: None,
            fallback_message: fallback_message.into(),
        }
    }

    /// Create an empty session from chat configuration
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.fallback_message.clone())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether a chat request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Topic most recently reported by the service
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    /// Most recent assistant message, if any
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
    }

    /// Start a send: validate, append the user message, and mark pending
    ///
    /// Returns the query to dispatch. Nothing changes when the input is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while another request is pending and `Validation` for
    /// empty or whitespace-only input
    pub fn begin_send(&mut self, input: &str) -> ClientResult<String> {
        if self.pending {
            tracing::debug!("Ignoring send while a chat request is pending");
            return Err(DocubotError::Busy(
                "a chat request is already in flight".to_string(),
            ));
        }

        let query = input.trim();
        if query.is_empty() {
            return Err(DocubotError::Validation("query is empty".to_string()));
        }

        self.messages.push(Message::user(query));
        self.pending = true;
        Ok(query.to_string())
    }

    /// Finish a send started with [`begin_send`](Self::begin_send)
    ///
    /// Appends exactly one assistant message and clears the pending flag.
    /// Failures never surface the raw error in the transcript.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if no request is pending; the transcript is left
    /// untouched in that case
    pub fn finish_send(&mut self, result: ClientResult<ChatReply>) -> ClientResult<SendOutcome> {
        if !self.pending {
            return Err(DocubotError::Validation(
                "no chat request is in flight".to_string(),
            ));
        }
        self.pending = false;

        match result {
            Ok(reply) => {
                let topic_changed = self.record_topic(&reply);
                self.messages
                    .push(Message::assistant_with_sources(reply.answer, reply.sources));
                Ok(SendOutcome::Answered { topic_changed })
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                self.messages
                    .push(Message::assistant(self.fallback_message.clone()));
                Ok(SendOutcome::Degraded {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Send a query through `api` and record the exchange
    ///
    /// # Errors
    ///
    /// Returns `Busy` or `Validation` when the send is rejected before
    /// dispatch; no request is issued in either case. Remote failures are
    /// reported as [`SendOutcome::Degraded`], not as errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::client::FakeRagClient;
    /// use docubot::session::ChatSession;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let api = FakeRagClient::new();
    /// let mut session = ChatSession::new("Sorry, try again.");
    ///
    /// session.send(&api, "hello").await.unwrap();
    /// assert_eq!(session.len(), 2);
    ///
    /// assert!(session.send(&api, "   ").await.is_err());
    /// assert_eq!(api.calls().chat, 1);
    /// # }
    /// ```
    pub async fn send(&mut self, api: &dyn RagApi, input: &str) -> ClientResult<SendOutcome> {
        let query = self.begin_send(input)?;
        let result = api.send_chat(&query).await;
        self.finish_send(result)
    }

    /// Start a new conversation
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a request is pending
    pub fn reset(&mut self) -> ClientResult<()> {
        if self.pending {
            return Err(DocubotError::Busy(
                "cannot start a new conversation while a request is pending".to_string(),
            ));
        }
        self.messages.clear();
        self.topic = None;
        tracing::info!("Started a new conversation");
        Ok(())
    }

    fn record_topic(&mut self, reply: &ChatReply) -> bool {
        let Some(topic) = &reply.topic else {
            return reply.topic_changed.unwrap_or(false);
        };

        let changed = reply
            .topic_changed
            .unwrap_or_else(|| self.topic.as_deref() != Some(topic.as_str()));
        if changed {
            tracing::debug!(topic = %topic, "Conversation topic changed");
        }
        self.topic = Some(topic.clone());
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeRagClient;

    const FALLBACK: &str = "Sorry, something went wrong.";

    #[tokio::test]
    async fn test_empty_and_whitespace_queries_are_rejected() {
        let api = FakeRagClient::new();
        let mut session = ChatSession::new(FALLBACK);

        for input in ["", "   ", "\n\t "] {
            let result = session.send(&api, input).await;
            assert!(matches!(result, Err(DocubotError::Validation(_))));
        }

        assert!(session.is_empty());
        assert!(!session.is_pending());
        assert_eq!(api.calls().chat, 0);
    }

    #[tokio::test]
    async fn test_successful_send_appends_user_then_assistant() {
        let api = FakeRagClient::new();
        api.push_reply(ChatReply::new(
            "Chapter 4 covers it.",
            vec!["book.pdf".to_string()],
        ));
        let mut session = ChatSession::new(FALLBACK);

        let outcome = session.send(&api, "  Where is X?  ").await.unwrap();
        assert_eq!(
            outcome,
            SendOutcome::Answered {
                topic_changed: false
            }
        );

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[0].text(), "Where is X?");
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].text(), "Chapter 4 covers it.");
        assert_eq!(messages[1].sources(), ["book.pdf".to_string()]);
        assert_eq!(api.queries(), vec!["Where is X?"]);
    }

    #[tokio::test]
    async fn test_failed_send_appends_fallback_not_raw_error() {
        let api = FakeRagClient::new();
        api.push_chat_error(DocubotError::Server {
            status: 500,
            message: "Traceback: KeyError".to_string(),
        });
        let mut session = ChatSession::new(FALLBACK);

        let outcome = session.send(&api, "hello").await.unwrap();
        assert!(matches!(outcome, SendOutcome::Degraded { .. }));

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role(), Role::Assistant);
        assert_eq!(messages[1].text(), FALLBACK);
        assert!(!messages[1].text().contains("KeyError"));
        assert!(messages[1].sources().is_empty());
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_send_while_pending_is_noop() {
        let api = FakeRagClient::new();
        let mut session = ChatSession::new(FALLBACK);

        let query = session.begin_send("first").unwrap();
        assert!(session.is_pending());
        assert_eq!(session.len(), 1);

        let second = session.send(&api, "second").await;
        assert!(matches!(second, Err(DocubotError::Busy(_))));
        assert_eq!(session.len(), 1);
        assert_eq!(api.calls().chat, 0);

        let result = api.send_chat(&query).await;
        session.finish_send(result).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(api.calls().chat, 1);
    }

    #[test]
    fn test_finish_without_begin_is_rejected() {
        let mut session = ChatSession::new(FALLBACK);
        let result = session.finish_send(Ok(ChatReply::new("stray", Vec::new())));
        assert!(result.is_err());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_topic_tracking() {
        let api = FakeRagClient::new();
        api.push_reply(ChatReply::new("a", Vec::new()).with_topic("billing", true));
        api.push_reply(ChatReply {
            answer: "b".to_string(),
            topic: Some("billing".to_string()),
            ..Default::default()
        });
        api.push_reply(ChatReply {
            answer: "c".to_string(),
            topic: Some("shipping".to_string()),
            ..Default::default()
        });
        let mut session = ChatSession::new(FALLBACK);

        let first = session.send(&api, "q1").await.unwrap();
        assert_eq!(first, SendOutcome::Answered { topic_changed: true });
        let second = session.send(&api, "q2").await.unwrap();
        assert_eq!(
            second,
            SendOutcome::Answered {
                topic_changed: false
            }
        );
        let third = session.send(&api, "q3").await.unwrap();
        assert_eq!(third, SendOutcome::Answered { topic_changed: true });
        assert_eq!(session.topic(), Some("shipping"));
    }

    #[tokio::test]
    async fn test_reset_clears_transcript() {
        let api = FakeRagClient::new();
        let mut session = ChatSession::new(FALLBACK);
        session.send(&api, "hello").await.unwrap();

        session.reset().unwrap();
        assert!(session.is_empty());
        assert!(session.topic().is_none());
        assert!(session.last_reply().is_none());
    }

    #[test]
    fn test_reset_refused_while_pending() {
        let mut session = ChatSession::new(FALLBACK);
        session.begin_send("hello").unwrap();
        assert!(matches!(session.reset(), Err(DocubotError::Busy(_))));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_message_serialization_omits_missing_sources() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "user", "text": "hi" }));

        let json = serde_json::to_value(Message::assistant_with_sources(
            "ok",
            vec!["a.pdf".to_string()],
        ))
        .unwrap();
        assert_eq!(json["sources"], serde_json::json!(["a.pdf"]));
    }
}
