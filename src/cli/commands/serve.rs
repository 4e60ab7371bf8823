//! HTTP server with the web chat UI.
//!
//! Provides REST endpoints for asking questions and adding documents, plus
//! a minimal single-page chat client served at the root.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::rag::RagEngine;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    engine: RagEngine,
}

/// Run the HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'kysy doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let engine = RagEngine::new(settings)?;
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/documents", post(add_document))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kysy Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Chat UI", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask (RAG)", "POST /ask");
    Output::kv("Add Document", "POST /documents");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    /// Conversation thread this exchange is recorded under.
    #[serde(default = "default_thread")]
    thread_id: String,
}

fn default_thread() -> String {
    "web".to_string()
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<SourceInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    content: String,
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
struct AddDocumentRequest {
    text: String,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct AddDocumentResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// === Handlers ===

async fn chat_page() -> impl IntoResponse {
    Html(CHAT_PAGE)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Ask is infallible at the engine boundary; failures surface as the
/// apology answer with an empty source list, never as an HTTP error.
async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let result = state.engine.ask(&req.question, &req.thread_id).await;

    Json(AskResponse {
        answer: result.answer,
        sources: result
            .retrieved_docs
            .into_iter()
            .map(|doc| SourceInfo {
                content: doc.content,
                metadata: doc.metadata,
            })
            .collect(),
    })
}

async fn add_document(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddDocumentRequest>,
) -> impl IntoResponse {
    if state.engine.add_text_document(&req.text, req.metadata).await {
        Json(AddDocumentResponse {
            success: true,
            error: None,
        })
        .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AddDocumentResponse {
                success: false,
                error: Some("document ingestion failed".to_string()),
            }),
        )
            .into_response()
    }
}

/// Single-page chat client.
const CHAT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Kysy</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 720px; margin: 0 auto; padding: 1rem; }
  h1 { font-size: 1.2rem; }
  #log { border: 1px solid #ddd; border-radius: 8px; padding: 1rem; min-height: 320px; }
  .msg { margin: 0.5rem 0; white-space: pre-wrap; }
  .user { font-weight: 600; }
  .assistant { color: #1a4d8f; }
  form { display: flex; gap: 0.5rem; margin-top: 1rem; }
  input { flex: 1; padding: 0.5rem; border: 1px solid #ccc; border-radius: 6px; }
  button { padding: 0.5rem 1rem; border: 0; border-radius: 6px; background: #1a4d8f; color: #fff; }
</style>
</head>
<body>
<h1>Kysy</h1>
<div id="log"></div>
<form id="form">
  <input id="input" placeholder="Ask a question..." autocomplete="off" autofocus>
  <button type="submit">Ask</button>
</form>
<script>
const log = document.getElementById('log');
const form = document.getElementById('form');
const input = document.getElementById('input');

function append(cls, text) {
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const question = input.value.trim();
  if (!question) return;
  input.value = '';
  append('user', 'You: ' + question);
  try {
    const res = await fetch('/ask', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ question }),
    });
    const data = await res.json();
    append('assistant', 'Kysy: ' + data.answer);
  } catch (err) {
    append('assistant', 'Kysy: request failed: ' + err);
  }
});
</script>
</body>
</html>
"#;
