//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn studyhub() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("studyhub").unwrap()
}

const TINY_CATALOG: &str = r#"[
    {
        "slug": "memory",
        "name": "Memory",
        "level": "Beginner",
        "summary": "How remembering works.",
        "quiz": [
            {
                "q": "Which store holds information for seconds?",
                "options": ["Short-term memory", "Long-term memory"],
                "answer": 0,
                "explain": "Short-term memory decays within seconds without rehearsal."
            }
        ],
        "schedule": [
            { "text": "Read the overview" }
        ]
    }
]"#;

#[test]
fn branches_lists_builtin_catalog() {
    studyhub()
        .arg("branches")
        .assert()
        .success()
        .stdout(predicate::str::contains("cognitive"))
        .stdout(predicate::str::contains("developmental"))
        .stdout(predicate::str::contains("6 branches"));
}

#[test]
fn branches_with_custom_catalog() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branches.json");
    std::fs::write(&path, TINY_CATALOG).unwrap();

    studyhub()
        .arg("branches")
        .arg("--catalog")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("memory"))
        .stdout(predicate::str::contains("1 branches"));
}

#[test]
fn branches_with_missing_catalog_fails() {
    studyhub()
        .arg("branches")
        .arg("--catalog")
        .arg("/nonexistent/branches.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load catalog"));
}

#[test]
fn branches_rejects_duplicate_slugs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branches.json");
    std::fs::write(
        &path,
        r#"[
            { "slug": "x", "name": "A", "level": "Beginner", "summary": "a" },
            { "slug": "x", "name": "B", "level": "Beginner", "summary": "b" }
        ]"#,
    )
    .unwrap();

    studyhub()
        .arg("branches")
        .arg("--catalog")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate"));
}

#[test]
fn quiz_plays_offline_from_a_catalog_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branches.json");
    std::fs::write(&path, TINY_CATALOG).unwrap();

    studyhub()
        .arg("quiz")
        .arg("memory")
        .arg("--catalog")
        .arg(&path)
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("Final score: 100%"));
}

#[test]
fn quiz_reprompts_on_bad_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branches.json");
    std::fs::write(&path, TINY_CATALOG).unwrap();

    studyhub()
        .arg("quiz")
        .arg("memory")
        .arg("--catalog")
        .arg(&path)
        .write_stdin("zero\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter a number between 1 and 2."))
        .stdout(predicate::str::contains("Final score: 0%"));
}

#[test]
fn quiz_unknown_slug_fails() {
    studyhub()
        .arg("quiz")
        .arg("no-such-branch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown branch slug"));
}

#[test]
fn state_against_unreachable_server_fails() {
    studyhub()
        .arg("state")
        .arg("--client-id")
        .arg("c1")
        .arg("--server")
        .arg("http://127.0.0.1:1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to fetch state"));
}

#[test]
fn init_creates_config_once() {
    let dir = TempDir::new().unwrap();

    studyhub()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created studyhub.toml"));
    assert!(dir.path().join("studyhub.toml").exists());

    studyhub()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_names_every_subcommand() {
    studyhub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("branches"))
        .stdout(predicate::str::contains("state"))
        .stdout(predicate::str::contains("quiz"))
        .stdout(predicate::str::contains("init"));
}
