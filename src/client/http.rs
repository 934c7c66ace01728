//! reqwest-backed implementation of [`RagApi`]

use crate::client::types::{ChatReply, ChatRequest, Document, DocumentListing, IngestReceipt};
use crate::client::RagApi;
use crate::config::ServerConfig;
use crate::error::{ClientResult, DocubotError};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use url::Url;

/// HTTP client for the RAG service
///
/// Endpoints are resolved relative to the configured API root, e.g.
/// `http://localhost:8000/api/v1/rag/chat`.
///
/// # Examples
///
/// ```
/// use docubot::client::HttpRagClient;
/// use docubot::config::ServerConfig;
///
/// let client = HttpRagClient::new(&ServerConfig::default()).unwrap();
/// assert_eq!(client.api_root(), "http://localhost:8000/api/v1/rag");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRagClient {
    client: Client,
    api_root: Url,
}

impl HttpRagClient {
    /// Create a client for the given server configuration
    ///
    /// # Errors
    ///
    /// Returns `Config` if the API root is not a valid base URL or the HTTP
    /// client cannot be built
    pub fn new(config: &ServerConfig) -> ClientResult<Self> {
        let root = config.api_root();
        let api_root = Url::parse(&root)
            .map_err(|e| DocubotError::Config(format!("Invalid API root '{}': {}", root, e)))?;
        if api_root.cannot_be_a_base() {
            return Err(DocubotError::Config(format!(
                "API root '{}' cannot be used as a base URL",
                root
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("docubot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocubotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized RAG client: api_root={}", api_root);

        Ok(Self { client, api_root })
    }

    /// The API root all endpoints are resolved against
    pub fn api_root(&self) -> &str {
        self.api_root.as_str().trim_end_matches('/')
    }

    /// Build an endpoint URL by appending path segments to the API root
    ///
    /// Segments are percent-encoded, so document ids containing `/` or
    /// spaces stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DocubotError::Config(format!("API root '{}' cannot be a base", self.api_root))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map a transport failure to a `Network` error
fn transport_error(e: reqwest::Error) -> DocubotError {
    if e.is_timeout() {
        DocubotError::Network(format!("request timed out: {}", e))
    } else {
        DocubotError::Network(e.to_string())
    }
}

/// Turn a non-2xx response into a `Server` error
async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    tracing::error!("RAG service returned error {}: {}", status, message);
    Err(DocubotError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RagApi for HttpRagClient {
    async fn send_chat(&self, query: &str) -> ClientResult<ChatReply> {
        let url = self.endpoint(&["chat"])?;
        tracing::debug!("Sending chat query to {}", url);

        let response = self
            .client
            .post(url)
            .json(&ChatRequest { query })
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;
        let status = response.status();

        let body = response.text().await.map_err(transport_error)?;
        let reply: ChatReply = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unreadable chat response ({}): {}", status, e);
            DocubotError::Server {
                status: status.as_u16(),
                message: format!("invalid chat response: {}", e),
            }
        })?;
        tracing::debug!(sources = reply.sources.len(), "Received chat answer");
        Ok(reply)
    }

    async fn ingest_document(&self, bytes: Vec<u8>, filename: &str) -> ClientResult<IngestReceipt> {
        let url = self.endpoint(&["ingest"])?;
        let size = bytes.len();
        tracing::debug!(filename, size, "Uploading document to {}", url);

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| DocubotError::Upload(format!("Invalid upload part: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DocubotError::Upload(transport_error(e).to_string()))?;
        let response = ensure_success(response)
            .await
            .map_err(|e| DocubotError::Upload(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| DocubotError::Upload(transport_error(e).to_string()))?;
        if body.trim().is_empty() {
            return Ok(IngestReceipt::acknowledged(filename));
        }

        match serde_json::from_str::<IngestReceipt>(&body) {
            Ok(mut receipt) => {
                if receipt.filename.is_empty() {
                    receipt.filename = filename.to_string();
                }
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!("Unrecognized ingest response for {}: {}", filename, e);
                Ok(IngestReceipt::acknowledged(filename))
            }
        }
    }

    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        let url = self.endpoint(&["files"])?;
        tracing::debug!("Fetching document manifest from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocubotError::Fetch(transport_error(e).to_string()))?;
        let response = ensure_success(response)
            .await
            .map_err(|e| DocubotError::Fetch(e.to_string()))?;

        let listing: DocumentListing = response
            .json()
            .await
            .map_err(|e| DocubotError::Fetch(format!("Failed to parse listing: {}", e)))?;

        if let Some(count) = listing.count {
            if count != listing.documents.len() {
                tracing::warn!(
                    count,
                    received = listing.documents.len(),
                    "Document count does not match listing"
                );
            }
        }

        Ok(listing.documents)
    }

    async fn delete_document(&self, id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["files", id])?;
        tracing::debug!("Deleting document {} via {}", id, url);

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Document {} already removed", id);
            return Ok(());
        }

        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str, prefix: &str) -> ClientResult<HttpRagClient> {
        HttpRagClient::new(&ServerConfig {
            base_url: base_url.to_string(),
            api_prefix: prefix.to_string(),
            timeout_seconds: 5,
        })
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = client_for("http://localhost:8000", "/api/v1/rag").unwrap();
        let url = client.endpoint(&["chat"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/rag/chat");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = client_for("http://localhost:8000/", "/api/v1/rag/").unwrap();
        let url = client.endpoint(&["files"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/rag/files");
    }

    #[test]
    fn test_endpoint_encodes_document_id() {
        let client = client_for("http://localhost:8000", "/api/v1/rag").unwrap();
        let url = client.endpoint(&["files", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/rag/files/a%20b%2Fc"
        );
    }

    #[test]
    fn test_new_rejects_invalid_root() {
        let result = client_for("not a url", "/api");
        assert!(matches!(result, Err(DocubotError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let client = client_for("http://127.0.0.1:9", "/api/v1/rag").unwrap();
        let result = client.send_chat("hello").await;
        assert!(matches!(result, Err(DocubotError::Network(_))));
    }
}
