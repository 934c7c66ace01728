//! Workspace: one chat session, one upload flow, and the document manifest
//!
//! The [`Workspace`] wires the three state holders to a shared [`RagApi`]
//! and owns the cross-component rules: the manifest is refreshed when the
//! workspace opens and after every successful upload or delete.

use std::path::Path;
use std::sync::Arc;

use crate::client::{IngestReceipt, RagApi};
use crate::config::Config;
use crate::error::{ClientResult, DocubotError};
use crate::manifest::{Confirm, DeleteOutcome, ManifestStore};
use crate::session::{ChatSession, SendOutcome};
use crate::upload::{SelectedFile, UploadFlow, UploadState};

/// Client-side state for a single user
pub struct Workspace {
    api: Arc<dyn RagApi>,
    session: ChatSession,
    uploads: UploadFlow,
    manifest: ManifestStore,
}

impl Workspace {
    /// Create a workspace with an empty transcript and manifest
    pub fn new(api: Arc<dyn RagApi>, config: &Config) -> Self {
        Self {
            api,
            session: ChatSession::from_config(&config.chat),
            uploads: UploadFlow::from_config(&config.upload),
            manifest: ManifestStore::new(),
        }
    }

    /// Load the initial manifest
    ///
    /// A failed listing is logged and leaves the manifest empty; it does not
    /// prevent the workspace from being used.
    pub async fn open(&mut self) -> usize {
        match self.manifest.refresh(self.api.as_ref()).await {
            Ok(count) => {
                tracing::info!(documents = count, "Workspace opened");
                count
            }
            Err(e) => {
                tracing::warn!("Opened workspace without a document manifest: {}", e);
                0
            }
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn uploads(&self) -> &UploadFlow {
        &self.uploads
    }

    pub fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }

    /// Ask a question
    ///
    /// # Errors
    ///
    /// Returns `Validation` for empty input and `Busy` while another question
    /// is pending
    pub async fn ask(&mut self, query: &str) -> ClientResult<SendOutcome> {
        self.session.send(self.api.as_ref(), query).await
    }

    /// Start a new conversation
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a question is pending
    pub fn new_conversation(&mut self) -> ClientResult<()> {
        self.session.reset()
    }

    /// Read a file from disk and select it for upload
    ///
    /// # Errors
    ///
    /// Returns `Validation` for non-PDF or oversized files, `Io` if the file
    /// cannot be read, and `Busy` while an upload is in flight
    pub async fn select_file(&self, path: &Path) -> ClientResult<()> {
        let file = SelectedFile::from_path(path, self.uploads.max_file_size()).await?;
        self.uploads.select(file)
    }

    /// Drop the selected file
    ///
    /// # Errors
    ///
    /// Returns `Busy` while an upload is in flight
    pub fn clear_file(&self) -> ClientResult<()> {
        self.uploads.clear_file()
    }

    /// Upload the selected file, then refresh the manifest once
    ///
    /// # Errors
    ///
    /// Returns the upload flow's error; the manifest is not refreshed in
    /// that case
    pub async fn upload_selected(&mut self) -> ClientResult<IngestReceipt> {
        let receipt = self.uploads.upload(self.api.as_ref()).await?;
        if let Err(e) = self.manifest.refresh(self.api.as_ref()).await {
            tracing::debug!("Upload of {} kept despite failed refresh: {}", receipt.filename, e);
        }
        Ok(receipt)
    }

    /// Upload the file kept from a failed attempt again
    ///
    /// # Errors
    ///
    /// Returns `Validation` unless the last upload failed, otherwise the
    /// same errors as [`upload_selected`](Self::upload_selected)
    pub async fn retry_upload(&mut self) -> ClientResult<IngestReceipt> {
        if self.uploads.state() != UploadState::Error {
            return Err(DocubotError::Validation(
                "no failed upload to retry".to_string(),
            ));
        }
        self.upload_selected().await
    }

    /// Delete a document after confirmation
    ///
    /// # Errors
    ///
    /// Returns the client's error if the delete request fails
    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &mut dyn Confirm,
    ) -> ClientResult<DeleteOutcome> {
        self.manifest.delete(self.api.as_ref(), id, confirm).await
    }

    /// Re-fetch the manifest on demand
    ///
    /// # Errors
    ///
    /// Returns the client's `Fetch` error; the previous listing is kept
    pub async fn refresh_manifest(&mut self) -> ClientResult<usize> {
        self.manifest.refresh(self.api.as_ref()).await
    }
}
