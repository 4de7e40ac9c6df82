//! The static content catalog.
//!
//! Loads branch records from JSON (the built-in deployment data or a
//! user-supplied file) and validates them. The catalog is read-only for
//! the lifetime of the process; every other component treats it as an
//! immutable collaborator.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Branch;

/// JSON shipped with the binary: the six branches of the original
/// deployment.
const BUILTIN_BRANCHES: &str = include_str!("../data/branches.json");

/// Ordered, slug-indexed collection of branch records.
#[derive(Debug, Clone)]
pub struct Catalog {
    branches: Vec<Branch>,
    by_slug: HashMap<String, usize>,
}

impl Catalog {
    /// The catalog embedded in the binary.
    ///
    /// The built-in data is validated by tests, so a parse failure here
    /// is a packaging bug, not a runtime condition.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_BRANCHES).expect("built-in catalog is valid")
    }

    /// Load and validate a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse catalog: {}", path.display()))
    }

    /// Parse and validate a catalog from a JSON string.
    ///
    /// Validation enforces unique non-empty slugs and, for every quiz
    /// question, `answer < options.len()`.
    pub fn from_json(json: &str) -> Result<Self> {
        let branches: Vec<Branch> =
            serde_json::from_str(json).context("catalog is not a JSON array of branches")?;

        let mut by_slug = HashMap::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            anyhow::ensure!(!branch.slug.is_empty(), "branch #{i} has an empty slug");
            anyhow::ensure!(
                by_slug.insert(branch.slug.clone(), i).is_none(),
                "duplicate branch slug: {}",
                branch.slug
            );
            for (qi, question) in branch.quiz.iter().enumerate() {
                anyhow::ensure!(
                    question.answer < question.options.len(),
                    "branch '{}' question #{qi}: answer index {} out of range ({} options)",
                    branch.slug,
                    question.answer,
                    question.options.len()
                );
            }
        }

        Ok(Self { branches, by_slug })
    }

    /// All branches, in catalog order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// Look up a branch by slug.
    pub fn get(&self, slug: &str) -> Option<&Branch> {
        self.by_slug.get(slug).map(|&i| &self.branches[i])
    }

    /// Whether the catalog contains the given slug.
    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads_and_validates() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.contains("cognitive"));
        assert!(catalog.contains("methods"));
        assert!(!catalog.contains("phrenology"));
    }

    #[test]
    fn builtin_branches_have_quiz_and_schedule() {
        let catalog = Catalog::builtin();
        for branch in catalog.branches() {
            assert!(!branch.quiz.is_empty(), "{} has no quiz", branch.slug);
            assert!(!branch.schedule.is_empty(), "{} has no schedule", branch.slug);
        }
    }

    #[test]
    fn get_returns_matching_branch() {
        let catalog = Catalog::builtin();
        let branch = catalog.get("social").unwrap();
        assert_eq!(branch.name, "Social Psychology");
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let json = r#"[
            {"slug": "a", "name": "A", "level": "Beginner", "summary": ""},
            {"slug": "a", "name": "A again", "level": "Beginner", "summary": ""}
        ]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate branch slug"));
    }

    #[test]
    fn rejects_answer_index_out_of_range() {
        let json = r#"[{
            "slug": "a", "name": "A", "level": "Beginner", "summary": "",
            "quiz": [{"q": "Q?", "options": ["x", "y"], "answer": 2, "explain": ""}]
        }]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_empty_slug() {
        let json = r#"[{"slug": "", "name": "A", "level": "Beginner", "summary": ""}]"#;
        assert!(Catalog::from_json(json).is_err());
    }
}
