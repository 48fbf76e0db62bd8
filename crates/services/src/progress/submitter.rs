use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{LevelId, QuizSubmission, SubmissionResult};

use super::strategy::{SubmissionOutcome, SubmissionStrategy};
use crate::error::{SubmissionError, TierFailure};
use crate::levels::{DEFAULT_REFRESH_DELAY, LevelService};

/// Outcome of a submission, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub tier: &'static str,
    pub outcome: SubmissionOutcome,
    /// Tiers that failed before `tier` succeeded.
    pub skipped: Vec<TierFailure>,
}

impl SubmissionReport {
    #[must_use]
    pub fn result(&self) -> Option<&SubmissionResult> {
        self.outcome.result()
    }

    #[must_use]
    pub fn has_passed(&self) -> bool {
        self.result().is_some_and(|result| result.has_passed)
    }

    #[must_use]
    pub fn next_level_id(&self) -> Option<LevelId> {
        self.result().and_then(|result| result.next_level_id)
    }
}

/// Persists a finished quiz through an ordered list of strategies.
///
/// Holds no per-call state; the first strategy that succeeds wins and later
/// ones are not tried.
pub struct ProgressSubmitter {
    strategies: Vec<Arc<dyn SubmissionStrategy>>,
    levels: Arc<LevelService>,
    refresh_delay: Duration,
}

impl ProgressSubmitter {
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn SubmissionStrategy>>, levels: Arc<LevelService>) -> Self {
        Self {
            strategies,
            levels,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }

    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    #[must_use]
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    #[must_use]
    pub fn tiers(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[must_use]
    pub fn levels(&self) -> &Arc<LevelService> {
        &self.levels
    }

    /// Submit `submission`, falling through the strategies in order.
    ///
    /// On a passed result the next level is remembered locally and a delayed
    /// level refresh is scheduled.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Exhausted` when every strategy failed and
    /// `SubmissionError::NoStrategies` when none are configured.
    pub async fn submit(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionReport, SubmissionError> {
        if self.strategies.is_empty() {
            return Err(SubmissionError::NoStrategies);
        }

        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let tier = strategy.name();
            match strategy.submit(submission).await {
                Ok(outcome) => {
                    let outcome = self.normalize(submission.level_id, outcome);
                    tracing::info!(
                        tier,
                        level_id = %submission.level_id,
                        fallbacks = failures.len(),
                        "quiz submission stored"
                    );
                    let report = SubmissionReport {
                        tier,
                        outcome,
                        skipped: failures,
                    };
                    self.after_success(&report).await;
                    return Ok(report);
                }
                Err(err) => {
                    tracing::warn!(tier, error = %err, "submission tier failed, trying next");
                    failures.push(TierFailure {
                        tier,
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::error!(
            level_id = %submission.level_id,
            tiers = failures.len(),
            "all submission tiers failed"
        );
        Err(SubmissionError::Exhausted { failures })
    }

    fn normalize(&self, level_id: LevelId, outcome: SubmissionOutcome) -> SubmissionOutcome {
        match outcome {
            SubmissionOutcome::Structured(result) => {
                SubmissionOutcome::Structured(self.levels.complete_next_level(level_id, result))
            }
            SubmissionOutcome::Recorded => SubmissionOutcome::Recorded,
        }
    }

    async fn after_success(&self, report: &SubmissionReport) {
        if !report.has_passed() {
            return;
        }
        if let Some(next) = report.next_level_id() {
            if let Err(err) = self.levels.select_level(next).await {
                tracing::warn!(error = %err, next_level_id = %next, "could not remember next level");
            }
        }
        self.levels.schedule_refresh(self.refresh_delay);
    }
}
