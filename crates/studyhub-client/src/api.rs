//! Typed HTTP client for the studyhub `/api` routes.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use studyhub_core::model::{Branch, ClientState, QuizProgress, Task};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Errors observed by the sync client when talking to the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server does not know the requested slug or resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the payload shape.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server failed or returned an unexpected status.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` for failures of the transport rather than the
    /// request itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout(_) | ApiError::Network(_))
    }
}

/// Thin typed wrapper over the HTTP API. Cloning is cheap and shares
/// the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    timeout_secs: u64,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
            http,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_branches(&self) -> Result<Vec<Branch>, ApiError> {
        self.get_json("/api/branches").await
    }

    #[instrument(skip(self))]
    pub async fn get_branch(&self, slug: &str) -> Result<Branch, ApiError> {
        self.get_json(&format!("/api/branches/{slug}")).await
    }

    #[instrument(skip(self))]
    pub async fn get_state(&self, client_id: &str) -> Result<ClientState, ApiError> {
        self.get_json(&format!("/api/state/{client_id}")).await
    }

    #[instrument(skip(self))]
    pub async fn set_bookmark(
        &self,
        client_id: &str,
        slug: &str,
        bookmarked: bool,
    ) -> Result<(), ApiError> {
        self.put_json(
            &format!("/api/state/{client_id}/bookmarks/{slug}"),
            &serde_json::json!({ "bookmarked": bookmarked }),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_tasks(&self, client_id: &str, slug: &str) -> Result<Vec<Task>, ApiError> {
        self.get_json(&format!("/api/state/{client_id}/tasks/{slug}"))
            .await
    }

    #[instrument(skip(self, tasks))]
    pub async fn put_tasks(
        &self,
        client_id: &str,
        slug: &str,
        tasks: &[Task],
    ) -> Result<(), ApiError> {
        self.put_json(
            &format!("/api/state/{client_id}/tasks/{slug}"),
            &serde_json::json!({ "tasks": tasks }),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_quiz(
        &self,
        client_id: &str,
    ) -> Result<HashMap<String, QuizProgress>, ApiError> {
        self.get_json(&format!("/api/state/{client_id}/quiz")).await
    }

    #[instrument(skip(self))]
    pub async fn put_quiz_best(
        &self,
        client_id: &str,
        slug: &str,
        best: u32,
    ) -> Result<(), ApiError> {
        self.put_json(
            &format!("/api/state/{client_id}/quiz/{slug}"),
            &serde_json::json!({ "best": best }),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_notes(&self, client_id: &str) -> Result<String, ApiError> {
        #[derive(serde::Deserialize)]
        struct Notes {
            notes: String,
        }
        let notes: Notes = self.get_json(&format!("/api/state/{client_id}/notes")).await?;
        Ok(notes.notes)
    }

    #[instrument(skip(self, notes))]
    pub async fn put_notes(&self, client_id: &str, notes: &str) -> Result<(), ApiError> {
        self.put_json(
            &format!("/api/state/{client_id}/notes"),
            &serde_json::json!({ "notes": notes }),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(format!("{}{route}", self.base_url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn put_json<B: Serialize + ?Sized>(&self, route: &str, body: &B) -> Result<(), ApiError> {
        let response = self
            .http
            .put(format!("{}{route}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(response).await?;
        Ok(())
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(match status {
        404 => ApiError::NotFound(message),
        400 => ApiError::Validation(message),
        _ => ApiError::Server { status, message },
    })
}
