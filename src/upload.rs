//! Upload flow: select a PDF, send it for ingestion, report the result
//!
//! The flow is a small state machine over [`UploadState`]:
//!
//! ```text
//! idle ──select──▶ selected ──upload──▶ uploading ──▶ success ──(timer)──▶ idle
//!                     ▲                        └────▶ error ──select/upload──┘
//!                     └──────────── clear_file (any state but uploading) ──▶ idle
//! ```
//!
//! After a successful upload a timer returns the state to `idle` once the
//! configured display interval has elapsed. The timer is owned by the
//! [`UploadFlow`]: any user action cancels it, and dropping the flow cancels
//! it too, so the timer never touches state after teardown.

use crate::client::{IngestReceipt, RagApi};
use crate::config::UploadConfig;
use crate::error::{ClientResult, DocubotError};

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Leading bytes of every PDF file
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Status of the upload flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Selected,
    Uploading,
    Success,
    Error,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Selected => "selected",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Error => "error",
        };
        write!(f, "{}", label)
    }
}

/// A file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    filename: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    /// Wrap in-memory file contents
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a file from disk
    ///
    /// The extension and the on-disk size are checked before reading, so
    /// non-PDF and oversized files are rejected without loading them.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a path without a `.pdf` extension or larger
    /// than `max_size` bytes, and `Io` if the file cannot be read
    pub async fn from_path(path: &Path, max_size: u64) -> ClientResult<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DocubotError::Validation(format!("{} is not a file", path.display()))
            })?
            .to_string();

        if !has_pdf_extension(&filename) {
            return Err(DocubotError::Validation(format!(
                "{} is not a PDF file",
                filename
            )));
        }

        let size = tokio::fs::metadata(path).await?.len();
        if size > max_size {
            return Err(too_large(&filename, size, max_size));
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(filename, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check that the file is a PDF no larger than `max_size` bytes
    ///
    /// # Errors
    ///
    /// Returns `Validation` describing the first failed check
    ///
    /// # Examples
    ///
    /// ```
    /// use docubot::upload::SelectedFile;
    ///
    /// let pdf = SelectedFile::new("paper.PDF", b"%PDF-1.7 ...".to_vec());
    /// assert!(pdf.validate(1024).is_ok());
    ///
    /// let notes = SelectedFile::new("notes.txt", b"hello".to_vec());
    /// assert!(notes.validate(1024).is_err());
    /// ```
    pub fn validate(&self, max_size: u64) -> ClientResult<()> {
        if !has_pdf_extension(&self.filename) {
            return Err(DocubotError::Validation(format!(
                "{} is not a PDF file",
                self.filename
            )));
        }
        if self.bytes.is_empty() {
            return Err(DocubotError::Validation(format!(
                "{} is empty",
                self.filename
            )));
        }
        if !self.bytes.starts_with(PDF_SIGNATURE) {
            return Err(DocubotError::Validation(format!(
                "{} does not look like a PDF document",
                self.filename
            )));
        }
        if self.bytes.len() as u64 > max_size {
            return Err(too_large(&self.filename, self.bytes.len() as u64, max_size));
        }
        Ok(())
    }
}

fn too_large(filename: &str, size: u64, max_size: u64) -> DocubotError {
    DocubotError::Validation(format!(
        "{} is {} bytes, larger than the {} byte limit",
        filename, size, max_size
    ))
}

fn has_pdf_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[derive(Debug)]
struct UploadInner {
    state: UploadState,
    file: Option<SelectedFile>,
    last_error: Option<String>,
    receipt: Option<IngestReceipt>,
    /// Bumped on every transition so a stale timer cannot reset newer state
    generation: u64,
}

impl UploadInner {
    fn transition(&mut self, state: UploadState) {
        tracing::debug!(from = %self.state, to = %state, "Upload state transition");
        self.state = state;
        self.generation += 1;
    }
}

fn lock(inner: &Mutex<UploadInner>) -> MutexGuard<'_, UploadInner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

/// Single-file upload state machine
#[derive(Debug)]
pub struct UploadFlow {
    inner: Arc<Mutex<UploadInner>>,
    reset_timer: Mutex<Option<CancellationToken>>,
    success_display: Duration,
    max_file_size: u64,
}

impl UploadFlow {
    /// Create an idle flow
    pub fn new(success_display: Duration, max_file_size: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(UploadInner {
                state: UploadState::Idle,
                file: None,
                last_error: None,
                receipt: None,
                generation: 0,
            })),
            reset_timer: Mutex::new(None),
            success_display,
            max_file_size,
        }
    }

    /// Create an idle flow from upload configuration
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.success_display(), config.max_file_size_bytes)
    }

    pub fn state(&self) -> UploadState {
        lock(&self.inner).state
    }

    /// Largest file, in bytes, the flow accepts
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Name of the file currently held by the flow
    pub fn selected_filename(&self) -> Option<String> {
        lock(&self.inner)
            .file
            .as_ref()
            .map(|file| file.filename().to_string())
    }

    /// Error message of the last failed upload, while in the error state
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner).last_error.clone()
    }

    /// Receipt of the last successful upload, while in the success state
    pub fn receipt(&self) -> Option<IngestReceipt> {
        lock(&self.inner).receipt.clone()
    }

    /// Choose a file to upload
    ///
    /// Replaces any previously selected file. Invalid files leave the state
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-PDF, empty, or oversized file and `Busy`
    /// while an upload is in flight
    pub fn select(&self, file: SelectedFile) -> ClientResult<()> {
        file.validate(self.max_file_size)?;

        let mut inner = lock(&self.inner);
        if inner.state == UploadState::Uploading {
            return Err(DocubotError::Busy("an upload is in progress".to_string()));
        }

        self.cancel_reset_timer();
        tracing::info!(filename = file.filename(), size = file.len(), "Selected file");
        if inner.state == UploadState::Success {
            // Selecting dismisses the success display first
            inner.receipt = None;
            inner.transition(UploadState::Idle);
        }
        inner.file = Some(file);
        inner.last_error = None;
        inner.receipt = None;
        inner.transition(UploadState::Selected);
        Ok(())
    }

    /// Drop the selected file and return to idle
    ///
    /// # Errors
    ///
    /// Returns `Busy` while an upload is in flight
    pub fn clear_file(&self) -> ClientResult<()> {
        let mut inner = lock(&self.inner);
        if inner.state == UploadState::Uploading {
            return Err(DocubotError::Busy(
                "cannot clear the file while it is uploading".to_string(),
            ));
        }

        self.cancel_reset_timer();
        inner.file = None;
        inner.last_error = None;
        inner.receipt = None;
        inner.transition(UploadState::Idle);
        Ok(())
    }

    /// Upload the selected file
    ///
    /// From the error state this retries the retained file. On success the
    /// file reference is cleared and the success state is shown for the
    /// configured interval before returning to idle.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while another upload is in flight, `Validation` when no
    /// file is selected, and the client's `Upload` error when ingestion fails
    pub async fn upload(&self, api: &dyn RagApi) -> ClientResult<IngestReceipt> {
        let file = {
            let mut inner = lock(&self.inner);
            match inner.state {
                UploadState::Uploading => {
                    return Err(DocubotError::Busy("an upload is in progress".to_string()));
                }
                UploadState::Selected | UploadState::Error => {}
                UploadState::Idle | UploadState::Success => {
                    return Err(DocubotError::Validation("no file selected".to_string()));
                }
            }
            let Some(file) = inner.file.clone() else {
                return Err(DocubotError::Validation("no file selected".to_string()));
            };
            inner.last_error = None;
            inner.transition(UploadState::Uploading);
            file
        };

        tracing::info!(filename = file.filename(), "Uploading document");
        let result = api
            .ingest_document(file.bytes.clone(), file.filename())
            .await;

        let mut inner = lock(&self.inner);
        match &result {
            Ok(receipt) => {
                tracing::info!(
                    filename = %receipt.filename,
                    chunks = ?receipt.chunks_count,
                    "Document ingested"
                );
                inner.file = None;
                inner.receipt = Some(receipt.clone());
                inner.transition(UploadState::Success);
                let generation = inner.generation;
                drop(inner);
                self.arm_reset_timer(generation);
            }
            Err(e) => {
                tracing::warn!(filename = file.filename(), "Upload failed: {}", e);
                inner.last_error = Some(e.to_string());
                inner.transition(UploadState::Error);
            }
        }
        result
    }

    fn arm_reset_timer(&self, generation: u64) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let state: Weak<Mutex<UploadInner>> = Arc::downgrade(&self.inner);
        let delay = self.success_display;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let Some(state) = state.upgrade() else {
                        return;
                    };
                    let mut inner = lock(&state);
                    if inner.state == UploadState::Success && inner.generation == generation {
                        inner.receipt = None;
                        inner.transition(UploadState::Idle);
                    }
                }
            }
        });

        let mut timer = self.reset_timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = timer.replace(token) {
            previous.cancel();
        }
    }

    fn cancel_reset_timer(&self) {
        let mut timer = self.reset_timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = timer.take() {
            token.cancel();
        }
    }
}

impl Drop for UploadFlow {
    fn drop(&mut self) {
        self.cancel_reset_timer();
    }
}
