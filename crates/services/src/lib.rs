#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod levels;
pub mod progress;
pub mod quiz;
pub mod review;

#[cfg(test)]
mod testing;

pub use quiz_core::Clock;

pub use api::{ApiConfig, HttpApi, ProgressApi, QuestionApi};
pub use app_services::AppServices;
pub use error::{ApiError, LevelError, QuizError, StrategyError, SubmissionError, TierFailure};
pub use levels::{LevelService, LevelsRefreshed};
pub use progress::{ProgressSubmitter, SubmissionOutcome, SubmissionReport, SubmissionStrategy};
pub use quiz::{Advance, QuizConfig, QuizPhase, QuizReport, QuizRunner, QuizView, SubmissionStatus};
pub use review::{ReviewItem, ReviewService};
