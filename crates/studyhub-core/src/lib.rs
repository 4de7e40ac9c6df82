//! studyhub-core — Data model, content catalog, and quiz engine.
//!
//! This crate defines the fundamental types shared by the studyhub server
//! and sync client: the immutable branch catalog, the mutable per-client
//! state record, and the pure quiz scoring state machine.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod quiz;
