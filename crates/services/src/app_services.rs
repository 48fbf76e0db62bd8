use std::sync::Arc;

use storage::repository::{LocalStore, Storage};

use crate::Clock;
use crate::api::{ApiConfig, HttpApi, ProgressApi, QuestionApi};
use crate::error::QuizError;
use crate::levels::LevelService;
use crate::progress::{
    DirectSubmitStrategy, LegacyScoreStrategy, ProgressServiceStrategy, ProgressSubmitter,
    SubmissionStrategy,
};
use crate::quiz::{QuizConfig, QuizRunner, QuizView, resolve_level_id};
use crate::review::ReviewService;
use quiz_core::model::LevelId;

/// Assembles app-facing services around one API configuration and one local store.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    config: QuizConfig,
    store: Arc<dyn LocalStore>,
    questions: Arc<dyn QuestionApi>,
    levels: Arc<LevelService>,
    submitter: Arc<ProgressSubmitter>,
    review: Arc<ReviewService>,
}

impl AppServices {
    /// Wire the HTTP client.
    ///
    /// The direct submission tier gets its own client so it does not share
    /// connection state with the preferred tier.
    #[must_use]
    pub fn new_http(api: ApiConfig, storage: &Storage, config: QuizConfig, clock: Clock) -> Self {
        let player_name = api.player_name().map(str::to_owned);
        let shared = Arc::new(HttpApi::new(api.clone()));
        let direct: Arc<dyn ProgressApi> = Arc::new(HttpApi::new(api));

        Self::new(
            shared.clone(),
            shared,
            direct,
            Arc::clone(&storage.local),
            player_name,
            config,
            clock,
        )
    }

    /// Wire arbitrary API implementations.
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionApi>,
        progress: Arc<dyn ProgressApi>,
        direct: Arc<dyn ProgressApi>,
        store: Arc<dyn LocalStore>,
        player_name: Option<String>,
        config: QuizConfig,
        clock: Clock,
    ) -> Self {
        let levels = Arc::new(LevelService::new(Arc::clone(&progress), Arc::clone(&store)));
        let strategies: Vec<Arc<dyn SubmissionStrategy>> = vec![
            Arc::new(ProgressServiceStrategy::new(Arc::clone(&progress))),
            Arc::new(DirectSubmitStrategy::new(Arc::clone(&direct))),
            Arc::new(LegacyScoreStrategy::new(direct, player_name)),
        ];
        let submitter = Arc::new(
            ProgressSubmitter::new(strategies, Arc::clone(&levels))
                .with_refresh_delay(config.refresh_delay()),
        );
        let review = Arc::new(ReviewService::new(progress));

        Self {
            clock,
            config,
            store,
            questions,
            levels,
            submitter,
            review,
        }
    }

    #[must_use]
    pub fn levels(&self) -> Arc<LevelService> {
        Arc::clone(&self.levels)
    }

    #[must_use]
    pub fn submitter(&self) -> Arc<ProgressSubmitter> {
        Arc::clone(&self.submitter)
    }

    #[must_use]
    pub fn review(&self) -> Arc<ReviewService> {
        Arc::clone(&self.review)
    }

    /// Level to quiz on, from `param` or the remembered level.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::MissingLevel` when neither yields a usable id.
    pub async fn resolve_level(&self, param: Option<&str>) -> Result<LevelId, QuizError> {
        resolve_level_id(param, self.store.as_ref()).await
    }

    /// Fresh runner for one quiz, rendering through `view`.
    #[must_use]
    pub fn quiz_runner(&self, view: Arc<dyn QuizView>) -> QuizRunner {
        QuizRunner::new(Arc::clone(&self.questions), self.submitter(), view)
            .with_clock(self.clock)
            .with_fetch_timeout(self.config.fetch_timeout())
    }
}
