//! studyhub-client — Client identity and state synchronization.
//!
//! Bridges a local view of the study hub to the server's state store:
//! optimistic mutations with explicit rollback where the contract
//! demands it, and a debounced autosave for free-text notes.

pub mod api;
pub mod debounce;
pub mod identity;
pub mod sync;

pub use api::{ApiClient, ApiError};
pub use identity::resolve_client_id;
pub use sync::{Notice, Notifier, NoopNotifier, SyncClient, SyncError, View};
