//! Per-client state store.
//!
//! One record per client identifier, held in memory and optionally
//! written through as one JSON document per client. Every
//! read-modify-write cycle for a given client runs under that client's
//! own lock, so two concurrent field updates can interleave across
//! clients but never lose each other's writes for the same record.
//!
//! Reads against an unknown client see an empty default; nothing is
//! persisted until the first write. The one exception is the task-list
//! read, which is an atomic get-or-create: the first `get_tasks` for a
//! slug materializes the branch's schedule template into the record and
//! persists it before returning.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use studyhub_core::catalog::Catalog;
use studyhub_core::error::StoreError;
use studyhub_core::model::{ClientState, QuizProgress, Task};

/// Cached load state for one client record.
enum Slot {
    /// Not yet checked against the persistence directory.
    Unloaded,
    /// Known absent; reads default, first write creates the record.
    Vacant,
    /// Loaded (or created) record.
    Occupied(ClientState),
}

/// The server-side state store.
pub struct StateStore {
    catalog: Arc<Catalog>,
    data_dir: Option<PathBuf>,
    clients: RwLock<HashMap<String, Arc<Mutex<Slot>>>>,
}

impl StateStore {
    /// A memory-only store; state is lost when the process exits.
    pub fn in_memory(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            data_dir: None,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// A store persisting one JSON document per client under `data_dir`.
    pub fn with_data_dir(catalog: Arc<Catalog>, data_dir: PathBuf) -> Self {
        Self {
            catalog,
            data_dir: Some(data_dir),
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The full record for a client, or an empty default if none exists.
    /// Never creates or persists anything.
    #[instrument(skip(self))]
    pub async fn get_state(&self, client_id: &str) -> Result<ClientState, StoreError> {
        let slot = self.slot(client_id).await;
        let mut guard = slot.lock().await;
        self.load(&mut guard, client_id).await?;
        Ok(match &*guard {
            Slot::Occupied(state) => state.clone(),
            _ => ClientState::new(client_id),
        })
    }

    /// Idempotent bookmark set. Creates the record if absent.
    #[instrument(skip(self))]
    pub async fn set_bookmark(
        &self,
        client_id: &str,
        slug: &str,
        bookmarked: bool,
    ) -> Result<(), StoreError> {
        self.require_branch(slug)?;
        self.mutate(client_id, |state| {
            state.bookmarks.insert(slug.to_string(), bookmarked);
        })
        .await
    }

    /// The client's task list for a slug.
    ///
    /// Absent lists are initialized from the branch schedule and
    /// persisted before returning, all under the client lock, so the
    /// get-or-create is a single externally observable operation.
    #[instrument(skip(self))]
    pub async fn get_tasks(&self, client_id: &str, slug: &str) -> Result<Vec<Task>, StoreError> {
        let template = self
            .catalog
            .get(slug)
            .ok_or_else(|| StoreError::UnknownSlug(slug.to_string()))?
            .schedule
            .clone();

        let slot = self.slot(client_id).await;
        let mut guard = slot.lock().await;
        self.load(&mut guard, client_id).await?;

        if let Slot::Occupied(state) = &*guard {
            if let Some(tasks) = state.tasks.get(slug) {
                return Ok(tasks.clone());
            }
        }

        let mut state = match std::mem::replace(&mut *guard, Slot::Unloaded) {
            Slot::Occupied(state) => state,
            _ => ClientState::new(client_id),
        };
        state.tasks.insert(slug.to_string(), template.clone());
        state.updated_at = Utc::now();
        self.persist(&state).await?;
        *guard = Slot::Occupied(state);
        debug!(client_id, slug, "initialized tasks from branch schedule");
        Ok(template)
    }

    /// Full replace of the task list for a slug.
    #[instrument(skip(self, tasks))]
    pub async fn put_tasks(
        &self,
        client_id: &str,
        slug: &str,
        tasks: Vec<Task>,
    ) -> Result<(), StoreError> {
        self.require_branch(slug)?;
        self.mutate(client_id, |state| {
            state.tasks.insert(slug.to_string(), tasks);
        })
        .await
    }

    /// All per-branch best scores for a client.
    #[instrument(skip(self))]
    pub async fn get_quiz_map(
        &self,
        client_id: &str,
    ) -> Result<HashMap<String, QuizProgress>, StoreError> {
        Ok(self.get_state(client_id).await?.quiz)
    }

    /// Unconditionally overwrite the best score for a slug. The client
    /// owns the max-merge; the server persists whatever is sent.
    #[instrument(skip(self))]
    pub async fn put_quiz_best(
        &self,
        client_id: &str,
        slug: &str,
        best: u32,
    ) -> Result<(), StoreError> {
        self.require_branch(slug)?;
        self.mutate(client_id, |state| {
            state.quiz.insert(slug.to_string(), QuizProgress { best });
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_notes(&self, client_id: &str) -> Result<String, StoreError> {
        Ok(self.get_state(client_id).await?.notes)
    }

    /// Full replace of the notes blob.
    #[instrument(skip(self, notes))]
    pub async fn put_notes(&self, client_id: &str, notes: String) -> Result<(), StoreError> {
        self.mutate(client_id, |state| {
            state.notes = notes;
        })
        .await
    }

    /// Out-of-band administrative delete; not exposed over HTTP.
    #[instrument(skip(self))]
    pub async fn remove_state(&self, client_id: &str) -> Result<(), StoreError> {
        let slot = self.slot(client_id).await;
        let mut guard = slot.lock().await;
        *guard = Slot::Vacant;
        if let Some(path) = self.doc_path(client_id) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Storage(e.to_string())),
            }
        }
        Ok(())
    }

    fn require_branch(&self, slug: &str) -> Result<(), StoreError> {
        if self.catalog.contains(slug) {
            Ok(())
        } else {
            Err(StoreError::UnknownSlug(slug.to_string()))
        }
    }

    /// The per-client lock, created on first touch.
    async fn slot(&self, client_id: &str) -> Arc<Mutex<Slot>> {
        if let Some(slot) = self.clients.read().await.get(client_id) {
            return Arc::clone(slot);
        }
        let mut clients = self.clients.write().await;
        Arc::clone(
            clients
                .entry(client_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Slot::Unloaded))),
        )
    }

    /// Resolve an `Unloaded` slot against the persistence directory.
    async fn load(&self, slot: &mut Slot, client_id: &str) -> Result<(), StoreError> {
        if !matches!(slot, Slot::Unloaded) {
            return Ok(());
        }
        let Some(path) = self.doc_path(client_id) else {
            *slot = Slot::Vacant;
            return Ok(());
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(json) => {
                let state: ClientState = serde_json::from_str(&json).map_err(|e| {
                    StoreError::Storage(format!("corrupt document {}: {e}", path.display()))
                })?;
                *slot = Slot::Occupied(state);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => *slot = Slot::Vacant,
            Err(e) => return Err(StoreError::Storage(e.to_string())),
        }
        Ok(())
    }

    /// Apply a closure to the (created-if-absent) record and persist it.
    async fn mutate<F>(&self, client_id: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut ClientState),
    {
        let slot = self.slot(client_id).await;
        let mut guard = slot.lock().await;
        self.load(&mut guard, client_id).await?;

        let mut state = match std::mem::replace(&mut *guard, Slot::Unloaded) {
            Slot::Occupied(state) => state,
            _ => ClientState::new(client_id),
        };
        apply(&mut state);
        state.updated_at = Utc::now();
        self.persist(&state).await?;
        *guard = Slot::Occupied(state);
        Ok(())
    }

    async fn persist(&self, state: &ClientState) -> Result<(), StoreError> {
        let Some(path) = self.doc_path(&state.client_id) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Document path for a client. Client ids are untrusted input, so
    /// anything outside `[A-Za-z0-9._-]` is replaced before it becomes a
    /// file name.
    fn doc_path(&self, client_id: &str) -> Option<PathBuf> {
        let dir = self.data_dir.as_ref()?;
        let name: String = client_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Some(dir.join(format!("{name}.json")))
    }
}
