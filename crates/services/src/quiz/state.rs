use chrono::{DateTime, Utc};

use quiz_core::model::{Attempt, LevelId, QuizSubmission, QuizSummary};

/// Lifecycle of one quiz run. `Finished` is terminal; retrying builds a new runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    InProgress,
    Finished,
}

/// Aggregated view of quiz progress, used for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based position of the question on screen.
    pub current: usize,
    pub total: usize,
    pub answered: usize,
    pub percent: u32,
}

impl QuizProgress {
    #[must_use]
    pub fn label(&self) -> String {
        format!("Question {} of {}", self.current, self.total)
    }
}

/// Mutable state of a running quiz, owned by a single `QuizRunner`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    level_id: LevelId,
    total: usize,
    current_index: usize,
    score: u32,
    attempts: Vec<Attempt>,
    current_answered: bool,
    submitted: bool,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl SessionState {
    #[must_use]
    pub fn new(level_id: LevelId, total: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            level_id,
            total,
            current_index: 0,
            score: 0,
            attempts: Vec::with_capacity(total),
            current_answered: false,
            submitted: false,
            started_at,
            finished_at: None,
        }
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.current_answered
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.total
    }

    /// Record the answer to the current question. Returns `false` when the
    /// current question already has one.
    pub fn record(&mut self, attempt: Attempt) -> bool {
        if self.current_answered {
            return false;
        }
        if attempt.is_correct() {
            self.score += 1;
        }
        self.attempts.push(attempt);
        self.current_answered = true;
        true
    }

    /// Move to the next question. Returns `false` when there is none.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_index += 1;
        self.current_answered = false;
        true
    }

    pub fn finish(&mut self, at: DateTime<Utc>) {
        if self.finished_at.is_none() {
            self.finished_at = Some(at);
        }
    }

    /// Flip the one-shot submission guard. Returns `false` if it was already set.
    pub fn mark_submitted(&mut self) -> bool {
        !std::mem::replace(&mut self.submitted, true)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let current = (self.current_index + 1).min(self.total);
        let percent = if self.total == 0 {
            0
        } else {
            u32::try_from(current * 100 / self.total).unwrap_or(100)
        };
        QuizProgress {
            current,
            total: self.total,
            answered: self.attempts.len(),
            percent,
        }
    }

    #[must_use]
    pub fn summary(&self) -> QuizSummary {
        let total = u32::try_from(self.total).unwrap_or(u32::MAX);
        QuizSummary::new(self.level_id, self.score, total)
    }

    #[must_use]
    pub fn submission(&self) -> QuizSubmission {
        QuizSubmission::new(self.level_id, self.attempts.clone())
    }
}
