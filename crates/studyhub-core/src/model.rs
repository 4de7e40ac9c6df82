//! Core data model types for studyhub.
//!
//! These are the fundamental types the entire studyhub system uses to
//! represent branches, quizzes, and per-client state. Wire field names
//! follow the deployed JSON API, so branch fields that the frontend
//! consumes in camelCase are renamed accordingly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named subject area of the static content catalog.
///
/// Branches are server-owned and immutable at runtime; they are created
/// when the catalog is loaded and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Unique key identifying this branch (e.g. "cognitive").
    pub slug: String,
    /// Human-readable name.
    pub name: String,
    /// Difficulty level label (e.g. "Beginner").
    pub level: String,
    /// Display image URL.
    #[serde(rename = "heroImage", default)]
    pub hero_image: String,
    /// One-paragraph summary.
    pub summary: String,
    /// Key ideas covered by this branch.
    #[serde(rename = "keyIdeas", default)]
    pub key_ideas: Vec<String>,
    /// Influential psychologists associated with the branch.
    #[serde(default)]
    pub psychologists: Vec<String>,
    /// Memory aids.
    #[serde(default)]
    pub mnemonics: Vec<Mnemonic>,
    /// External study resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Suggested practice activities.
    #[serde(default)]
    pub activities: Vec<String>,
    /// Quiz questions for this branch.
    #[serde(default)]
    pub quiz: Vec<Question>,
    /// Default task template; copied into a client's task list on first
    /// access and independent of it thereafter.
    #[serde(default)]
    pub schedule: Vec<Task>,
}

/// A memory aid with a title and the actual hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mnemonic {
    pub title: String,
    pub hint: String,
}

/// An external study resource link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// A single quiz question with index-addressed options.
///
/// Invariant (enforced at catalog load): `0 <= answer < options.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub q: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub answer: usize,
    /// Explanation shown after answering.
    #[serde(default)]
    pub explain: String,
}

/// A checklist entry in a study plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Best quiz score achieved for a branch, as a percentage (0–100).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizProgress {
    pub best: u32,
}

/// The mutable per-browser-identity record: bookmarks, task checklists,
/// quiz bests, and free-text notes.
///
/// A record is created lazily on the first write for a new `client_id`;
/// reads against an unknown client see an empty default without anything
/// being persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientState {
    /// Opaque, client-generated, stable token. Never issued by the server.
    pub client_id: String,
    /// Membership-style bookmark toggle set, keyed by branch slug.
    #[serde(default)]
    pub bookmarks: HashMap<String, bool>,
    /// Per-branch task lists, lazily initialized from the branch schedule.
    #[serde(default)]
    pub tasks: HashMap<String, Vec<Task>>,
    /// Per-branch best quiz scores.
    #[serde(default)]
    pub quiz: HashMap<String, QuizProgress>,
    /// Single free-text notes blob, no per-branch scoping.
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientState {
    /// An empty record for the given client, timestamped now.
    pub fn new(client_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            client_id: client_id.into(),
            bookmarks: HashMap::new(),
            tasks: HashMap::new(),
            quiz: HashMap::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
