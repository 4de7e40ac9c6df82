//! Pure quiz scoring state machine.
//!
//! Tracks progress through a question sequence entirely client-side; the
//! only network interaction a quiz ever causes is the final best-score
//! write, which is the sync client's job, not this module's.

use thiserror::Error;

use crate::model::Question;

/// Errors from driving a [`QuizEngine`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    /// `advance` was called with no option selected. Surfaced as a
    /// user-facing prompt, not a hard error.
    #[error("no option selected for the current question")]
    NoSelection,

    /// `select_option` was called with an index past the option list.
    #[error("option index {index} out of range ({options} options)")]
    InvalidOption { index: usize, options: usize },

    /// The quiz already reached its last question.
    #[error("quiz is already finished")]
    Finished,

    /// A quiz needs at least one question.
    #[error("cannot start a quiz with no questions")]
    Empty,
}

/// Result of a successful [`QuizEngine::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The answer was recorded and there are more questions.
    Next {
        /// Whether the recorded answer was correct.
        correct: bool,
        /// Explanation for the question just answered.
        explanation: String,
    },
    /// The answer was recorded and the quiz is complete.
    Finished {
        correct: bool,
        explanation: String,
        /// Percentage score, rounded half-up to the nearest integer.
        score: u32,
    },
}

/// Single-user, single-threaded quiz state machine.
///
/// There is no in-place reset: restarting means constructing a new
/// engine. Selection may be changed freely before each `advance`.
#[derive(Debug)]
pub struct QuizEngine {
    questions: Vec<Question>,
    index: usize,
    selected: Option<usize>,
    correct_count: u32,
    finished: bool,
}

impl QuizEngine {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            questions,
            index: 0,
            selected: None,
            correct_count: 0,
            finished: false,
        })
    }

    /// The question currently awaiting an answer.
    pub fn current(&self) -> &Question {
        &self.questions[self.index.min(self.questions.len() - 1)]
    }

    /// Zero-based index of the current question.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// The tentatively selected option, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Questions answered so far as an integer percentage, for progress
    /// display.
    pub fn progress_percent(&self) -> u32 {
        round_percent(self.index as u32, self.questions.len() as u32)
    }

    /// Record a tentative choice for the current question. Does not
    /// advance; may be called repeatedly to change the selection.
    pub fn select_option(&mut self, index: usize) -> Result<(), QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        let options = self.current().options.len();
        if index >= options {
            return Err(QuizError::InvalidOption { index, options });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Commit the current selection: score it, then move to the next
    /// question (selection cleared) or finish.
    ///
    /// Fails with [`QuizError::NoSelection`] if nothing is selected; the
    /// current index is unchanged in that case.
    pub fn advance(&mut self) -> Result<Step, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        let selected = self.selected.ok_or(QuizError::NoSelection)?;
        let question = &self.questions[self.index];
        let correct = selected == question.answer;
        let explanation = question.explain.clone();
        if correct {
            self.correct_count += 1;
        }
        self.selected = None;

        if self.index + 1 < self.questions.len() {
            self.index += 1;
            Ok(Step::Next {
                correct,
                explanation,
            })
        } else {
            self.finished = true;
            Ok(Step::Finished {
                correct,
                explanation,
                score: round_percent(self.correct_count, self.questions.len() as u32),
            })
        }
    }
}

/// `round(part / whole * 100)` with half-up rounding, avoiding float
/// drift on the .5 boundary.
fn round_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part * 200 + whole) / (2 * whole)
}
