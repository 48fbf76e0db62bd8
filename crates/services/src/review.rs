use std::sync::Arc;

use quiz_core::model::{LevelId, Question, QuestionId};

use crate::api::ProgressApi;
use crate::error::ApiError;
use crate::quiz::{answer_label, question_heading};

/// One previously missed question, with its correct meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub number: usize,
    pub question_id: QuestionId,
    pub heading: String,
    pub correct_label: String,
    pub audio: Option<String>,
}

/// Lists questions the user last answered wrong.
#[derive(Clone)]
pub struct ReviewService {
    api: Arc<dyn ProgressApi>,
}

impl ReviewService {
    #[must_use]
    pub fn new(api: Arc<dyn ProgressApi>) -> Self {
        Self { api }
    }

    /// Fetch incorrectly answered questions, optionally for one level.
    ///
    /// Questions without a correct answer are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list cannot be fetched.
    pub async fn incorrect_questions(
        &self,
        level_id: Option<LevelId>,
    ) -> Result<Vec<ReviewItem>, ApiError> {
        let questions = self.api.incorrect_questions(level_id).await?;
        let fetched = questions.len();
        let items = build_items(&questions);
        tracing::info!(fetched, shown = items.len(), "loaded review questions");
        Ok(items)
    }
}

fn build_items(questions: &[Question]) -> Vec<ReviewItem> {
    questions
        .iter()
        .filter_map(|question| {
            let Some(correct) = question.correct_answer() else {
                tracing::warn!(question_id = %question.id(), "skipping question without a correct answer");
                return None;
            };
            Some((question, answer_label(correct)))
        })
        .enumerate()
        .map(|(index, (question, correct_label))| ReviewItem {
            number: index + 1,
            question_id: question.id(),
            heading: question_heading(index + 1, question),
            correct_label,
            audio: question.sound_file().map(str::to_owned),
        })
        .collect()
}
