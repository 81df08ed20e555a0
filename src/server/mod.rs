//! HTTP boundary: thin axum handlers over the ingestion pipeline, the
//! corpus cache, and the chat service. Request and response bodies match
//! the public site's API; everything of substance happens in the library
//! layers underneath.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::cache::CorpusCache;
use crate::chat::{ChatService, TRY_AGAIN_MESSAGE};
use crate::ingestion::{IngestRequest, IngestionPipeline};
use crate::stores::CorpusStore;

/// Shared handler state.
pub struct AppState {
    pub chat: ChatService,
    pub pipeline: IngestionPipeline,
    pub cache: Arc<CorpusCache>,
    pub store: Arc<dyn CorpusStore>,
    pub admin_password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/embeddings", get(list_embeddings).post(run_ingestion))
        .route("/chat", post(chat))
        .route("/auth", post(authenticate))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestBody {
    cv_text: Option<String>,
    #[serde(default)]
    urls: Vec<String>,
}

#[derive(Deserialize)]
struct ChatBody {
    query: String,
}

#[derive(Deserialize)]
struct AuthBody {
    password: String,
}

/// Debug surface: the current cached corpus as a JSON array, reloading a
/// cold cache from storage first.
async fn list_embeddings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let corpus = state.cache.get_or_reload(state.store.as_ref()).await;
    Json(corpus.as_ref().clone())
}

async fn run_ingestion(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestBody>,
) -> impl IntoResponse {
    let request = IngestRequest {
        cv_text: body.cv_text,
        urls: body.urls,
    };

    match state.pipeline.ingest(request).await {
        Ok(report) => {
            tracing::info!(
                chunks_added = report.chunks_added,
                sources_failed = report.sources_failed,
                "embeddings updated"
            );
            (StatusCode::OK, Json(json!({ "success": true })))
        }
        Err(err) => {
            tracing::error!(error = %err, "ingestion failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to update embeddings" })),
            )
        }
    }
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> impl IntoResponse {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid query" })),
        );
    }

    match state.chat.answer(&body.query).await {
        Ok(message) => (StatusCode::OK, Json(json!({ "message": message }))),
        Err(err) => {
            tracing::error!(error = %err, "chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": TRY_AGAIN_MESSAGE })),
            )
        }
    }
}

/// Single equality check against the configured admin password.
async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuthBody>,
) -> impl IntoResponse {
    if !state.admin_password.is_empty() && body.password == state.admin_password {
        (StatusCode::OK, Json(json!({ "success": true })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid password" })),
        )
    }
}
