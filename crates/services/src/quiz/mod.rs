//! The question → answer → next → score → submit flow.

mod level_source;
mod runner;
mod state;
mod view;

use std::time::Duration;

use crate::levels::DEFAULT_REFRESH_DELAY;

pub use level_source::resolve_level_id;
pub use runner::{Advance, QuizReport, QuizRunner, SubmissionStatus};
pub use state::{QuizPhase, QuizProgress, SessionState};
pub use view::{
    AnswerFeedback, ChoiceView, INSTRUCTION, LOAD_FAILED_MESSAGE, NO_QUESTIONS_MESSAGE,
    QuestionPrompt, QuizView, SUBMIT_FAILED_MESSAGE, SummaryView, answer_label, question_heading,
    score_message,
};

/// Bound on the question fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for the services built by `AppServices`.
///
/// The fetch timeout goes to each `QuizRunner`, the refresh delay to the
/// shared `ProgressSubmitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    fetch_timeout: Duration,
    refresh_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Delay before level data is re-fetched after a passed quiz.
    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }
}
