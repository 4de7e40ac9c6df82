//! The sync client: a local view of the study hub kept in step with the
//! server's state store.
//!
//! Mutation semantics follow the UI contract:
//! - bookmark toggles are optimistic with an explicit rollback on
//!   failure (every optimistic mutation ships with its inverse);
//! - task edits are optimistic and are NOT rolled back on failure; the
//!   local view stays ahead of persisted state until the next
//!   successful write or reload (a known, accepted gap);
//! - notes are written through after a quiet period, one request per
//!   interval no matter how fast the user types;
//! - quiz best scores are max-merged here, client-side; the server
//!   overwrites verbatim.
//!
//! No mutation is ever retried automatically: a single attempt, then a
//! one-shot user notification through the [`Notifier`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use studyhub_core::model::{Branch, QuizProgress, Task};

use crate::api::{ApiClient, ApiError};
use crate::debounce::Debouncer;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// A one-shot user-facing notification.
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

/// Sink for one-shot notifications (the toast layer of a UI).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Discards all notifications.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _: Notice) {}
}

/// Errors surfaced to the caller (as opposed to failures consumed as
/// notifications).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("view not loaded; call load() first")]
    NotLoaded,

    #[error("tasks for '{0}' not loaded; call load_tasks() first")]
    TasksNotLoaded(String),

    #[error("task index {index} out of range for '{slug}'")]
    InvalidTaskIndex { slug: String, index: usize },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The loaded local view: catalog plus this client's mutable state.
#[derive(Debug, Clone, Default)]
pub struct View {
    pub branches: Vec<Branch>,
    pub bookmarks: HashMap<String, bool>,
    pub tasks: HashMap<String, Vec<Task>>,
    pub quiz: HashMap<String, QuizProgress>,
    pub notes: String,
}

impl View {
    /// Whether a branch is currently bookmarked in the local view.
    pub fn is_bookmarked(&self, slug: &str) -> bool {
        self.bookmarks.get(slug).copied().unwrap_or(false)
    }

    /// Best score for a branch, 0 if never attempted.
    pub fn best_score(&self, slug: &str) -> u32 {
        self.quiz.get(slug).map(|p| p.best).unwrap_or(0)
    }
}

/// Bridges UI state to the state store for one client identity.
pub struct SyncClient {
    api: ApiClient,
    client_id: String,
    notifier: Arc<dyn Notifier>,
    autosave: Debouncer,
    view: Option<View>,
}

impl SyncClient {
    pub fn new(api: ApiClient, client_id: impl Into<String>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_debounce(api, client_id, notifier, DEFAULT_DEBOUNCE)
    }

    /// Override the notes autosave quiet period (tests use a short one).
    pub fn with_debounce(
        api: ApiClient,
        client_id: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        debounce: Duration,
    ) -> Self {
        Self {
            api,
            client_id: client_id.into(),
            notifier,
            autosave: Debouncer::new(debounce),
            view: None,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_loaded(&self) -> bool {
        self.view.is_some()
    }

    /// The loaded view; fails until [`SyncClient::load`] has succeeded.
    pub fn view(&self) -> Result<&View, SyncError> {
        self.view.as_ref().ok_or(SyncError::NotLoaded)
    }

    /// Fetch catalog, state, quiz map, and notes concurrently.
    ///
    /// All four must succeed before anything renders; a single failure
    /// surfaces one retryable notification and leaves the view unloaded
    /// rather than mixing stale and fresh data.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        let id = self.client_id.clone();
        let fetched = tokio::try_join!(
            self.api.get_branches(),
            self.api.get_state(&id),
            self.api.get_quiz(&id),
            self.api.get_notes(&id),
        );
        match fetched {
            Ok((branches, state, quiz, notes)) => {
                debug!(branches = branches.len(), "view loaded");
                self.view = Some(View {
                    branches,
                    bookmarks: state.bookmarks,
                    tasks: state.tasks,
                    quiz,
                    notes,
                });
                Ok(())
            }
            Err(e) => {
                self.notify("Could not load your data", &e);
                Err(e.into())
            }
        }
    }

    /// Optimistically flip a bookmark, then write through.
    ///
    /// On failure the flip is reverted and a notification raised; the
    /// returned value is always the bookmark's resulting local state.
    pub async fn toggle_bookmark(&mut self, slug: &str) -> Result<bool, SyncError> {
        let view = self.view.as_mut().ok_or(SyncError::NotLoaded)?;
        let previous = view.is_bookmarked(slug);
        let flipped = !previous;
        view.bookmarks.insert(slug.to_string(), flipped);

        match self.api.set_bookmark(&self.client_id, slug, flipped).await {
            Ok(()) => Ok(flipped),
            Err(e) => {
                // Compensating transition: restore the pre-toggle value.
                if let Some(view) = self.view.as_mut() {
                    view.bookmarks.insert(slug.to_string(), previous);
                }
                self.notify("Bookmark not saved", &e);
                Ok(previous)
            }
        }
    }

    /// The task list for a slug, fetching (and server-side
    /// initializing) it on first access.
    pub async fn load_tasks(&mut self, slug: &str) -> Result<Vec<Task>, SyncError> {
        if self.view.is_none() {
            return Err(SyncError::NotLoaded);
        }
        if let Some(tasks) = self.view.as_ref().and_then(|v| v.tasks.get(slug)) {
            return Ok(tasks.clone());
        }
        match self.api.get_tasks(&self.client_id, slug).await {
            Ok(tasks) => {
                if let Some(view) = self.view.as_mut() {
                    view.tasks.insert(slug.to_string(), tasks.clone());
                }
                Ok(tasks)
            }
            Err(e) => {
                self.notify("Could not load tasks", &e);
                Err(e.into())
            }
        }
    }

    /// Check or uncheck one task. Applies locally first; on write
    /// failure the local list deliberately stays ahead of the server.
    pub async fn set_task_done(
        &mut self,
        slug: &str,
        index: usize,
        done: bool,
    ) -> Result<(), SyncError> {
        self.mutate_tasks(slug, |tasks| {
            let task = tasks
                .get_mut(index)
                .ok_or_else(|| SyncError::InvalidTaskIndex {
                    slug: slug.to_string(),
                    index,
                })?;
            task.done = done;
            Ok(())
        })
        .await
    }

    /// Append a new unchecked task.
    pub async fn add_task(&mut self, slug: &str, text: impl Into<String>) -> Result<(), SyncError> {
        let text = text.into();
        self.mutate_tasks(slug, move |tasks| {
            tasks.push(Task { text, done: false });
            Ok(())
        })
        .await
    }

    async fn mutate_tasks<F>(&mut self, slug: &str, apply: F) -> Result<(), SyncError>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<(), SyncError>,
    {
        let view = self.view.as_mut().ok_or(SyncError::NotLoaded)?;
        let tasks = view
            .tasks
            .get_mut(slug)
            .ok_or_else(|| SyncError::TasksNotLoaded(slug.to_string()))?;
        apply(tasks)?;
        let snapshot = tasks.clone();

        if let Err(e) = self.api.put_tasks(&self.client_id, slug, &snapshot).await {
            // No rollback: the local view stays ahead until the next
            // successful write or reload.
            warn!(slug, error = %e, "task write failed; local state unsynced");
            self.notify("Tasks not saved", &e);
        }
        Ok(())
    }

    /// Record a keystroke: the local view updates synchronously and a
    /// single write is left pending until the quiet period elapses.
    pub fn edit_notes(&mut self, text: impl Into<String>) -> Result<(), SyncError> {
        let view = self.view.as_mut().ok_or(SyncError::NotLoaded)?;
        let text = text.into();
        view.notes = text.clone();

        let api = self.api.clone();
        let client_id = self.client_id.clone();
        let notifier = Arc::clone(&self.notifier);
        self.autosave.schedule(async move {
            if let Err(e) = api.put_notes(&client_id, &text).await {
                warn!(error = %e, "notes autosave failed");
                notifier.notify(Notice {
                    title: "Notes not saved".to_string(),
                    detail: e.to_string(),
                });
            }
        });
        Ok(())
    }

    /// Write the current notes immediately, cancelling any pending
    /// autosave. Intended for shutdown paths.
    pub async fn flush_notes(&mut self) -> Result<(), SyncError> {
        let view = self.view.as_ref().ok_or(SyncError::NotLoaded)?;
        let text = view.notes.clone();
        self.autosave.cancel();
        self.api.put_notes(&self.client_id, &text).await?;
        Ok(())
    }

    /// Persist a finished quiz's score.
    ///
    /// The monotonicity invariant lives here: the value sent is
    /// `max(previous best, score)`, because the server overwrites
    /// verbatim.
    pub async fn complete_quiz(&mut self, slug: &str, score: u32) -> Result<u32, SyncError> {
        let view = self.view.as_ref().ok_or(SyncError::NotLoaded)?;
        let best = view.best_score(slug).max(score);

        match self.api.put_quiz_best(&self.client_id, slug, best).await {
            Ok(()) => {
                if let Some(view) = self.view.as_mut() {
                    view.quiz.insert(slug.to_string(), QuizProgress { best });
                }
                Ok(best)
            }
            Err(e) => {
                self.notify("Score not saved", &e);
                Err(e.into())
            }
        }
    }

    fn notify(&self, title: &str, error: &ApiError) {
        self.notifier.notify(Notice {
            title: title.to_string(),
            detail: error.to_string(),
        });
    }
}
