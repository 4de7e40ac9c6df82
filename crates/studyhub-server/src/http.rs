//! HTTP JSON API.
//!
//! All routes are prefixed `/api`. Server-side errors map to status
//! codes per the store contract: 404 for unknown branch slugs, 400 for
//! malformed bodies, 500 for storage failures. Bodies are
//! `{"error": "..."}` on failure.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use studyhub_core::error::StoreError;
use studyhub_core::model::{Branch, ClientState, QuizProgress, Task};

use crate::store::StateStore;

/// Build the `/api` router over a state store.
pub fn router(store: Arc<StateStore>) -> Router {
    Router::new()
        .route("/api/", get(health))
        .route("/api/branches", get(list_branches))
        .route("/api/branches/{slug}", get(get_branch))
        .route("/api/state/{client_id}", get(get_state))
        .route(
            "/api/state/{client_id}/bookmarks/{slug}",
            put(put_bookmark),
        )
        .route(
            "/api/state/{client_id}/tasks/{slug}",
            get(get_tasks).put(put_tasks),
        )
        .route("/api/state/{client_id}/quiz", get(get_quiz))
        .route("/api/state/{client_id}/quiz/{slug}", put(put_quiz_best))
        .route(
            "/api/state/{client_id}/notes",
            get(get_notes).put(put_notes),
        )
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(addr: &str, store: Arc<StateStore>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "studyhub api listening");
    axum::serve(listener, router(store))
        .await
        .context("server error")?;
    Ok(())
}

/// Store error adapter carrying the HTTP status mapping.
struct ApiFailure(StoreError);

impl From<StoreError> for ApiFailure {
    fn from(err: StoreError) -> Self {
        ApiFailure(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// JSON extractor whose rejection is a 400 with an `{"error": ...}`
/// body, matching the rest of the API.
struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response()),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "studyhub api" }))
}

async fn list_branches(State(store): State<Arc<StateStore>>) -> Json<Vec<Branch>> {
    Json(store.catalog().branches().to_vec())
}

async fn get_branch(
    State(store): State<Arc<StateStore>>,
    Path(slug): Path<String>,
) -> Result<Json<Branch>, ApiFailure> {
    store
        .catalog()
        .get(&slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure(StoreError::UnknownSlug(slug)))
}

async fn get_state(
    State(store): State<Arc<StateStore>>,
    Path(client_id): Path<String>,
) -> Result<Json<ClientState>, ApiFailure> {
    Ok(Json(store.get_state(&client_id).await?))
}

#[derive(Debug, Deserialize)]
struct BookmarkPayload {
    bookmarked: bool,
}

#[derive(Debug, Serialize)]
struct BookmarkAck {
    slug: String,
    bookmarked: bool,
}

async fn put_bookmark(
    State(store): State<Arc<StateStore>>,
    Path((client_id, slug)): Path<(String, String)>,
    ApiJson(payload): ApiJson<BookmarkPayload>,
) -> Result<Json<BookmarkAck>, ApiFailure> {
    store
        .set_bookmark(&client_id, &slug, payload.bookmarked)
        .await?;
    Ok(Json(BookmarkAck {
        slug,
        bookmarked: payload.bookmarked,
    }))
}

#[derive(Debug, Deserialize)]
struct TasksPayload {
    tasks: Vec<Task>,
}

async fn get_tasks(
    State(store): State<Arc<StateStore>>,
    Path((client_id, slug)): Path<(String, String)>,
) -> Result<Json<Vec<Task>>, ApiFailure> {
    Ok(Json(store.get_tasks(&client_id, &slug).await?))
}

async fn put_tasks(
    State(store): State<Arc<StateStore>>,
    Path((client_id, slug)): Path<(String, String)>,
    ApiJson(payload): ApiJson<TasksPayload>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    store.put_tasks(&client_id, &slug, payload.tasks).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn get_quiz(
    State(store): State<Arc<StateStore>>,
    Path(client_id): Path<String>,
) -> Result<Json<HashMap<String, QuizProgress>>, ApiFailure> {
    Ok(Json(store.get_quiz_map(&client_id).await?))
}

#[derive(Debug, Deserialize)]
struct QuizBestPayload {
    best: u32,
}

#[derive(Debug, Serialize)]
struct QuizBestAck {
    slug: String,
    best: u32,
}

async fn put_quiz_best(
    State(store): State<Arc<StateStore>>,
    Path((client_id, slug)): Path<(String, String)>,
    ApiJson(payload): ApiJson<QuizBestPayload>,
) -> Result<Json<QuizBestAck>, ApiFailure> {
    store.put_quiz_best(&client_id, &slug, payload.best).await?;
    Ok(Json(QuizBestAck {
        slug,
        best: payload.best,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
struct NotesPayload {
    notes: String,
}

async fn get_notes(
    State(store): State<Arc<StateStore>>,
    Path(client_id): Path<String>,
) -> Result<Json<NotesPayload>, ApiFailure> {
    Ok(Json(NotesPayload {
        notes: store.get_notes(&client_id).await?,
    }))
}

async fn put_notes(
    State(store): State<Arc<StateStore>>,
    Path(client_id): Path<String>,
    ApiJson(payload): ApiJson<NotesPayload>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    store.put_notes(&client_id, payload.notes).await?;
    Ok(Json(json!({ "ok": true })))
}
