//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use quiz_core::model::{AnswerId, LevelId, QuestionId};
use storage::repository::StorageError;

/// Errors emitted by the HTTP API client and its fakes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted while loading or driving a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no level specified, please go back and select a level")]
    MissingLevel,
    #[error("no questions found for level {level_id}")]
    NoQuestions { level_id: LevelId },
    #[error("unable to load questions: {0}")]
    Fetch(#[from] ApiError),
    #[error("loading questions timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("question {question_id} has fewer than two answers")]
    MalformedQuestion { question_id: QuestionId },
    #[error("quiz already started")]
    AlreadyStarted,
    #[error("quiz is not in progress")]
    NotInProgress,
    #[error("current question has not been answered")]
    Unanswered,
    #[error("answer {0} does not belong to the current question")]
    UnknownAnswer(AnswerId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure of a single submission tier.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrategyError {
    #[error("no answers to submit")]
    NothingToSubmit,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One tier's failure, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierFailure {
    pub tier: &'static str,
    pub message: String,
}

/// Errors emitted by `ProgressSubmitter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("unable to record score: all {} submission methods failed", .failures.len())]
    Exhausted { failures: Vec<TierFailure> },
    #[error("no submission methods configured")]
    NoStrategies,
}

/// Errors emitted by `LevelService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LevelError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
