mod common;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docubot::client::{Document, HttpRagClient, RagApi};
use docubot::error::DocubotError;

use common::{server_config, temp_pdf};

#[tokio::test]
async fn test_send_chat_posts_query_and_parses_sources() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/chat"))
        .and(body_json(json!({ "query": "When is the launch?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "The launch is in **March**.",
            "sources": ["roadmap.pdf"],
            "topic": "launch planning",
            "topic_changed": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let reply = client.send_chat("When is the launch?").await.unwrap();

    assert_eq!(reply.answer, "The launch is in **March**.");
    assert_eq!(reply.sources, vec!["roadmap.pdf".to_string()]);
    assert_eq!(reply.topic.as_deref(), Some("launch planning"));
    assert_eq!(reply.topic_changed, Some(true));
}

#[tokio::test]
async fn test_send_chat_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let err = client.send_chat("hi").await.unwrap_err();

    match err {
        DocubotError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model unavailable");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_chat_non_json_body_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let err = client.send_chat("hi").await.unwrap_err();

    match err {
        DocubotError::Server { status, message } => {
            assert_eq!(status, 200);
            assert!(message.starts_with("invalid chat response"));
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ingest_sends_multipart_file() {
    let server = MockServer::start().await;
    let (_dir, pdf) = temp_pdf("report.pdf");
    let bytes = std::fs::read(&pdf).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/ingest"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-42",
            "filename": "report.pdf",
            "message": "Document ingested",
            "chunks_count": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let receipt = client.ingest_document(bytes, "report.pdf").await.unwrap();

    assert_eq!(receipt.id.as_deref(), Some("doc-42"));
    assert_eq!(receipt.filename, "report.pdf");
    assert_eq!(receipt.chunks_count, Some(7));
}

#[tokio::test]
async fn test_ingest_empty_body_is_acknowledged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/ingest"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let receipt = client
        .ingest_document(b"%PDF-1.4".to_vec(), "a.pdf")
        .await
        .unwrap();

    assert_eq!(receipt.filename, "a.pdf");
    assert_eq!(receipt.id, None);
}

#[tokio::test]
async fn test_ingest_failure_is_upload_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/rag/ingest"))
        .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let err = client
        .ingest_document(b"%PDF-1.4".to_vec(), "a.pdf")
        .await
        .unwrap_err();

    assert!(matches!(err, DocubotError::Upload(ref msg) if msg.contains("413")));
}

#[tokio::test]
async fn test_list_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/rag/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                { "id": "d1", "filename": "a.pdf" },
                { "id": "d2", "filename": "b.pdf" }
            ],
            "count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let docs = client.list_documents().await.unwrap();

    assert_eq!(
        docs,
        vec![Document::new("d1", "a.pdf"), Document::new("d2", "b.pdf")]
    );
}

#[tokio::test]
async fn test_list_documents_failure_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/rag/files"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let err = client.list_documents().await.unwrap_err();
    assert!(matches!(err, DocubotError::Fetch(_)));
}

#[tokio::test]
async fn test_delete_document_encodes_id() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/rag/files/annual%20report"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    client.delete_document("annual report").await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_document_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/rag/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    assert!(client.delete_document("gone").await.is_ok());
}

#[tokio::test]
async fn test_delete_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/rag/files/d1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = HttpRagClient::new(&server_config(&server.uri())).unwrap();
    let err = client.delete_document("d1").await.unwrap_err();
    assert!(matches!(err, DocubotError::Server { status: 500, .. }));
}
