//! # Server Integration Tests
//!
//! Boots the real Axum app on a random port with a pre-built index in a temp
//! directory, and stubs the embeddings and chat APIs with wiremock.

use anyhow::Result;
use docbot::history::HistoryTurn;
use docbot::index::{index_db_path, VectorIndex};
use docbot::ingest::build_index;
use docbot_server::{config::Config, run};
use docbot_test_utils::MockEmbedder;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a small index under `dir` using the deterministic mock embedder.
/// The server is then configured with the same model id, so the query-time
/// fingerprint check passes.
async fn build_test_index(dir: &Path) -> Result<()> {
    let index_dir = dir.join("chroma_db");
    std::fs::create_dir_all(&index_dir)?;
    let db_path = index_db_path(&index_dir);
    let index = VectorIndex::open(&db_path.to_string_lossy()).await?;
    let embedder = MockEmbedder::new();
    build_index(
        &index,
        &embedder,
        vec![
            "Solar cells convert light into electricity.".to_string(),
            "An inverter turns DC power into AC power.".to_string(),
            "Panels degrade slowly over decades.".to_string(),
        ],
        "solar.pdf",
    )
    .await?;
    Ok(())
}

fn test_config(dir: &Path, mock_uri: &str) -> Config {
    Config {
        port: 0,
        pdf_path: "solar.pdf".to_string(),
        index_dir: dir.join("chroma_db").to_string_lossy().into_owned(),
        embed_model: "mock-embedder".to_string(),
        embeddings_api_url: format!("{mock_uri}/v1/embeddings"),
        retrieval_k: 2,
        ollama_model: "test-model".to_string(),
        ollama_api_url: format!("{mock_uri}/v1/chat/completions"),
        history_file: dir.join("chat_history.json").to_string_lossy().into_owned(),
        max_history_turns: 5,
        generation_timeout_secs: 5,
    }
}

async fn spawn_app(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{port}");

    tokio::spawn(async move {
        if let Err(e) = run(listener, config).await {
            eprintln!("Server error: {e}");
        }
    });

    // Give the server a moment to start.
    sleep(Duration::from_millis(100)).await;

    address
}

fn embeddings_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": [{ "embedding": [1.0, 1.0, 1.0, 1.0] }]
    }))
}

fn chat_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn a_question_gets_a_grounded_reply_and_is_logged() -> Result<()> {
    let dir = TempDir::new()?;
    build_test_index(dir.path()).await?;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(embeddings_response())
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_response("Grounded answer from the model."))
        .mount(&mock_server)
        .await;

    let address = spawn_app(test_config(dir.path(), &mock_server.uri())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{address}/webhook"))
        .json(&json!({ "user_id": "u1", "text": "How do solar cells work?" }))
        .send()
        .await?;

    assert!(response.status().is_success());
    let body: Value = response.json().await?;
    assert_eq!(body["reply"], "Grounded answer from the model.");

    // The exchange was durably recorded for the next turn.
    let raw = tokio::fs::read_to_string(dir.path().join("chat_history.json")).await?;
    let history: HashMap<String, Vec<HistoryTurn>> = serde_json::from_str(&raw)?;
    assert_eq!(history["u1"].len(), 1);
    assert_eq!(history["u1"][0].user, "How do solar cells work?");
    Ok(())
}

#[tokio::test]
async fn commands_and_empty_messages_never_reach_the_providers() -> Result<()> {
    let dir = TempDir::new()?;
    build_test_index(dir.path()).await?;

    // Any provider traffic at all fails the test when the server drops.
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(embeddings_response())
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_response("should never be asked"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let address = spawn_app(test_config(dir.path(), &mock_server.uri())).await;
    let client = reqwest::Client::new();

    for (text, expected) in [
        ("/id", "msg id: unknown"),
        ("/ID", "msg id: unknown"),
        ("", "(empty message)"),
    ] {
        let body: Value = client
            .post(format!("{address}/webhook"))
            .json(&json!({ "user_id": "u1", "text": text }))
            .send()
            .await?
            .json()
            .await?;
        assert_eq!(body["reply"], expected);
    }

    let body: Value = client
        .post(format!("{address}/webhook"))
        .json(&json!({ "user_id": "u1", "message_id": "m-42", "text": "/source" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(
        body["reply"],
        "Indexed PDF: solar.pdf\nEmbeddings: mock-embedder\nTop-k: 2"
    );

    mock_server.verify().await;
    Ok(())
}

#[tokio::test]
async fn retrieve_endpoint_returns_ranked_chunks() -> Result<()> {
    let dir = TempDir::new()?;
    build_test_index(dir.path()).await?;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(embeddings_response())
        .mount(&mock_server)
        .await;

    let address = spawn_app(test_config(dir.path(), &mock_server.uri())).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{address}/retrieve"))
        .json(&json!({ "query": "solar power", "k": 1 }))
        .send()
        .await?
        .json()
        .await?;

    let results = body.as_array().expect("expected a JSON array");
    assert_eq!(results.len(), 1);
    assert!(results[0]["content"].is_string());
    assert!(results[0]["score"].is_number());
    Ok(())
}

#[tokio::test]
async fn liveness_probes_answer() -> Result<()> {
    let dir = TempDir::new()?;
    build_test_index(dir.path()).await?;
    let mock_server = MockServer::start().await;

    let address = spawn_app(test_config(dir.path(), &mock_server.uri())).await;
    let client = reqwest::Client::new();

    let health = client.get(format!("{address}/health")).send().await?;
    assert!(health.status().is_success());
    assert_eq!(health.text().await?, "OK");

    let root = client.get(format!("{address}/")).send().await?;
    assert_eq!(root.text().await?, "docbot server is running.");
    Ok(())
}
