use std::sync::Arc;

use async_trait::async_trait;

use quiz_core::model::{LegacyScore, QuizSubmission, SubmissionResult};

use crate::api::ProgressApi;
use crate::error::StrategyError;

/// What a successful tier produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Progress was stored and the server reported pass/fail.
    Structured(SubmissionResult),
    /// Score was stored without any pass/fail information.
    Recorded,
}

impl SubmissionOutcome {
    #[must_use]
    pub fn result(&self) -> Option<&SubmissionResult> {
        match self {
            Self::Structured(result) => Some(result),
            Self::Recorded => None,
        }
    }
}

/// One way of persisting a finished quiz.
#[async_trait]
pub trait SubmissionStrategy: Send + Sync {
    /// Short stable name used in logs and reports.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns `StrategyError` when this tier could not persist the quiz.
    async fn submit(&self, submission: &QuizSubmission)
    -> Result<SubmissionOutcome, StrategyError>;
}

//
// ─── TIER 1: PROGRESS SERVICE ──────────────────────────────────────────────────
//

/// Preferred tier: the shared progress service handle.
pub struct ProgressServiceStrategy {
    service: Arc<dyn ProgressApi>,
}

impl ProgressServiceStrategy {
    #[must_use]
    pub fn new(service: Arc<dyn ProgressApi>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SubmissionStrategy for ProgressServiceStrategy {
    fn name(&self) -> &'static str {
        "progress-service"
    }

    async fn submit(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionOutcome, StrategyError> {
        if submission.answers.is_empty() {
            return Err(StrategyError::NothingToSubmit);
        }
        tracing::debug!(
            level_id = %submission.level_id,
            answers = submission.answers.len(),
            "submitting quiz through progress service"
        );
        let result = self.service.submit_quiz(submission).await?;
        Ok(SubmissionOutcome::Structured(result))
    }
}

//
// ─── TIER 2: DIRECT ────────────────────────────────────────────────────────────
//

/// Same endpoint and payload as tier 1, sent through a separately built client.
pub struct DirectSubmitStrategy {
    endpoint: Arc<dyn ProgressApi>,
}

impl DirectSubmitStrategy {
    #[must_use]
    pub fn new(endpoint: Arc<dyn ProgressApi>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl SubmissionStrategy for DirectSubmitStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn submit(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionOutcome, StrategyError> {
        let result = self.endpoint.submit_quiz(submission).await?;
        Ok(SubmissionOutcome::Structured(result))
    }
}

//
// ─── TIER 3: LEGACY SCORE ──────────────────────────────────────────────────────
//

/// Last resort: the older scores endpoint, which only stores a tally.
pub struct LegacyScoreStrategy {
    endpoint: Arc<dyn ProgressApi>,
    player_name: Option<String>,
}

impl LegacyScoreStrategy {
    #[must_use]
    pub fn new(endpoint: Arc<dyn ProgressApi>, player_name: Option<String>) -> Self {
        Self {
            endpoint,
            player_name,
        }
    }
}

#[async_trait]
impl SubmissionStrategy for LegacyScoreStrategy {
    fn name(&self) -> &'static str {
        "legacy-score"
    }

    async fn submit(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionOutcome, StrategyError> {
        let record = LegacyScore::from_submission(submission, self.player_name.clone());
        self.endpoint.record_legacy_score(&record).await?;
        tracing::info!(
            level = %record.level,
            score = record.score,
            max_score = record.max_score,
            "score recorded through legacy endpoint"
        );
        Ok(SubmissionOutcome::Recorded)
    }
}
