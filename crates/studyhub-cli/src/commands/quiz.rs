//! The `studyhub quiz` command.
//!
//! Drives the quiz state machine on the terminal. When a server is
//! given, the final score is synced through the sync client, so the
//! client-side max-merge applies exactly as it would in the UI.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use studyhub_client::{ApiClient, Notice, Notifier, SyncClient};
use studyhub_core::model::Question;
use studyhub_core::quiz::{QuizEngine, QuizError, Step};

/// Prints notifications to stderr, where a UI would raise a toast.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("! {}: {}", notice.title, notice.detail);
    }
}

pub async fn execute(
    slug: String,
    server: Option<String>,
    client_id: Option<String>,
    catalog_path: Option<PathBuf>,
) -> Result<()> {
    let questions = load_questions(&slug, server.as_deref(), catalog_path.as_deref()).await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let score = play(questions, &mut lines)?;

    println!("\nFinal score: {score}%");

    if let Some(server) = server {
        let client_id = match client_id {
            Some(id) => id,
            None => studyhub_client::resolve_client_id(),
        };
        let mut sync = SyncClient::new(
            ApiClient::new(&server),
            client_id,
            Arc::new(ConsoleNotifier),
        );
        sync.load()
            .await
            .with_context(|| format!("failed to load state from {server}"))?;
        let best = sync
            .complete_quiz(&slug, score)
            .await
            .context("failed to sync quiz score")?;
        println!("Best score for '{slug}': {best}%");
    }

    Ok(())
}

async fn load_questions(
    slug: &str,
    server: Option<&str>,
    catalog_path: Option<&std::path::Path>,
) -> Result<Vec<Question>> {
    // With a server, its catalog is authoritative.
    let branch = match server {
        Some(server) => ApiClient::new(server)
            .get_branch(slug)
            .await
            .with_context(|| format!("failed to fetch branch '{slug}' from {server}"))?,
        None => super::load_catalog(catalog_path)?
            .get(slug)
            .cloned()
            .with_context(|| format!("unknown branch slug: {slug}"))?,
    };
    anyhow::ensure!(!branch.quiz.is_empty(), "branch '{slug}' has no quiz");
    Ok(branch.quiz)
}

/// Run the question loop over any line source; split out for testing.
fn play<I>(questions: Vec<Question>, lines: &mut I) -> Result<u32>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut engine = QuizEngine::new(questions)?;

    loop {
        let question = engine.current();
        println!(
            "\n[{}/{}] {}",
            engine.index() + 1,
            engine.total(),
            question.q
        );
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        print!("Answer: ");
        io::stdout().flush()?;

        let line = lines
            .next()
            .context("stdin closed before the quiz finished")??;
        let choice = match line.trim().parse::<usize>() {
            Ok(n) if n >= 1 => n - 1,
            _ => {
                println!("Enter a number between 1 and {}.", engine.current().options.len());
                continue;
            }
        };
        if let Err(QuizError::InvalidOption { options, .. }) = engine.select_option(choice) {
            println!("Enter a number between 1 and {options}.");
            continue;
        }

        match engine.advance()? {
            Step::Next {
                correct,
                explanation,
            } => print_feedback(correct, &explanation),
            Step::Finished {
                correct,
                explanation,
                score,
            } => {
                print_feedback(correct, &explanation);
                return Ok(score);
            }
        }
    }
}

fn print_feedback(correct: bool, explanation: &str) {
    if correct {
        println!("Correct!");
    } else {
        println!("Incorrect.");
    }
    if !explanation.is_empty() {
        println!("{explanation}");
    }
}
