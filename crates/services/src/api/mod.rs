//! Contracts of the remote vocabulary API and their HTTP implementation.

mod config;
pub mod csrf;
mod http;

use async_trait::async_trait;

use quiz_core::model::{LegacyScore, LevelId, LevelList, Question, QuizSubmission, SubmissionResult};

use crate::error::ApiError;

pub use config::{ApiConfig, DEFAULT_API_URL};
pub use http::HttpApi;

/// Source of quiz questions.
#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// Fetch every question attached to a level, in server order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure or a non-success status.
    async fn questions_by_level(&self, level_id: LevelId) -> Result<Vec<Question>, ApiError>;
}

/// Progress endpoints: level list, quiz submission and the older score record.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` on network failure or a non-success status.
    async fn user_levels(&self) -> Result<LevelList, ApiError>;

    /// Submit a finished quiz. Requires a CSRF token and the session cookie.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, rejection, or an undecodable body.
    async fn submit_quiz(&self, submission: &QuizSubmission)
    -> Result<SubmissionResult, ApiError>;

    /// Best-effort write to the legacy scores endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure or a non-success status.
    async fn record_legacy_score(&self, score: &LegacyScore) -> Result<(), ApiError>;

    /// Questions whose most recent attempt was wrong, optionally for one level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure or a non-success status.
    async fn incorrect_questions(
        &self,
        level_id: Option<LevelId>,
    ) -> Result<Vec<Question>, ApiError>;
}
