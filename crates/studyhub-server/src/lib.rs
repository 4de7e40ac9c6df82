//! studyhub-server — Per-client state store and HTTP API.
//!
//! The store keeps one mutable record per client identifier and
//! serializes all read-modify-write cycles for a given client behind a
//! per-client lock, so concurrent field updates never lose writes. The
//! HTTP layer maps the store onto the `/api` JSON routes.

pub mod http;
pub mod store;

pub use http::{router, serve};
pub use store::StateStore;
