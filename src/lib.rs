//! DocuBot - client library for a document question-answering service
//!
//! This library talks to a retrieval-augmented generation (RAG) service over
//! HTTP and keeps the client-side state of a chat: the transcript, the PDF
//! upload flow, and the list of ingested documents.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: The `RagApi` trait, its HTTP implementation, and a scripted fake
//! - `session`: Chat transcript with a single pending request at a time
//! - `upload`: Upload flow state machine for one selected PDF
//! - `manifest`: Cached list of ingested documents and confirmed deletes
//! - `workspace`: Wires the three together and refreshes the manifest
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Terminal handlers for the CLI
//!
//! # Example
//!
//! ```no_run
//! use docubot::{client::create_client, Config, Workspace};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let api = create_client(&config.server)?;
//!     let mut workspace = Workspace::new(api, &config);
//!     workspace.open().await;
//!     workspace.ask("What does the handbook say about leave?").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod session;
pub mod upload;
pub mod workspace;

// Re-export commonly used types
pub use client::{ChatReply, Document, IngestReceipt, RagApi};
pub use config::Config;
pub use error::{ClientResult, DocubotError, Result};
pub use manifest::{DeleteOutcome, ManifestStore};
pub use session::{ChatSession, Message, Role, SendOutcome};
pub use upload::{SelectedFile, UploadFlow, UploadState};
pub use workspace::Workspace;
