//! Local cache of the documents known to the service
//!
//! The [`ManifestStore`] never patches its list locally: after every
//! mutation it refetches the full listing, since only the service knows
//! whether an ingest or delete really took effect. A failed refresh keeps
//! the previous listing.

use crate::client::{Document, RagApi};
use crate::error::ClientResult;

/// Yes/no confirmation asked before destructive operations
pub trait Confirm {
    /// Ask the user; `true` means proceed
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user confirmed and the service removed the document
    Deleted,
    /// The user declined; no request was issued
    Declined,
}

/// Cached document listing
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    documents: Vec<Document>,
    last_error: Option<String>,
}

impl ManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a cached document by id
    pub fn find(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Error from the most recent refresh, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the cached listing with the service's current one
    ///
    /// Returns the number of documents now cached.
    ///
    /// # Errors
    ///
    /// Returns the client's `Fetch` error; the previous listing is kept
    pub async fn refresh(&mut self, api: &dyn RagApi) -> ClientResult<usize> {
        match api.list_documents().await {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "Refreshed document manifest");
                self.documents = documents;
                self.last_error = None;
                Ok(self.documents.len())
            }
            Err(e) => {
                tracing::warn!("Failed to refresh document manifest: {}", e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Delete a document after asking for confirmation
    ///
    /// The prompt names the document's filename (or its id when it is not in
    /// the cached listing). Declining issues no request. After a successful
    /// delete the listing is refreshed; a failed refresh is logged and
    /// recorded in [`last_error`](Self::last_error) but does not fail the
    /// delete.
    ///
    /// # Errors
    ///
    /// Returns the client's `Network` or `Server` error if the delete fails
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::client::{Document, FakeRagClient};
    /// use docubot::manifest::{DeleteOutcome, ManifestStore};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let api = FakeRagClient::with_documents(vec![Document::new("7", "q3.pdf")]);
    /// let mut manifest = ManifestStore::new();
    /// manifest.refresh(&api).await.unwrap();
    ///
    /// let mut decline = |_: &str| false;
    /// let outcome = manifest.delete(&api, "7", &mut decline).await.unwrap();
    /// assert_eq!(outcome, DeleteOutcome::Declined);
    /// assert_eq!(api.calls().delete, 0);
    /// # }
    /// ```
    pub async fn delete(
        &mut self,
        api: &dyn RagApi,
        id: &str,
        confirm: &mut dyn Confirm,
    ) -> ClientResult<DeleteOutcome> {
        let label = self
            .find(id)
            .map(|doc| doc.filename.clone())
            .unwrap_or_else(|| id.to_string());

        let prompt = format!("Delete \"{}\" from the knowledge base?", label);
        if !confirm.confirm(&prompt) {
            tracing::debug!("Delete of {} declined", id);
            return Ok(DeleteOutcome::Declined);
        }

        api.delete_document(id).await?;
        tracing::info!(id, filename = %label, "Deleted document");

        if let Err(e) = self.refresh(api).await {
            tracing::debug!("Keeping delete of {} despite failed refresh: {}", id, e);
        }
        Ok(DeleteOutcome::Deleted)
    }
}
