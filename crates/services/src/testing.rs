//! Fakes shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use quiz_core::model::{
    Answer, AnswerId, LegacyScore, Level, LevelId, LevelList, Question, QuestionId,
    QuizSubmission, SubmissionResult,
};

use crate::api::{ProgressApi, QuestionApi};
use crate::error::ApiError;
use crate::quiz::{AnswerFeedback, QuestionPrompt, QuizView, SummaryView};
use crate::progress::SubmissionReport;

pub fn level(id: u64, number: u32) -> Level {
    Level {
        id: LevelId::new(id),
        number,
        name: format!("Level {number}"),
        description: None,
        is_unlocked: true,
        is_completed: false,
        score: 0,
        max_score: 0,
        percentage_score: 0.0,
        has_passed: false,
    }
}

/// Question `id` with three answers `id*10+1..=id*10+3`; `correct` picks the
/// correct offset (1-based) or none.
pub fn question(id: u64, correct: Option<u64>) -> Question {
    let answers = (1..=3)
        .map(|offset| {
            Answer::new(
                AnswerId::new(id * 10 + offset),
                format!("th-{id}-{offset}"),
                format!("en-{id}-{offset}"),
                Some(offset) == correct,
            )
        })
        .collect();
    Question::new(QuestionId::new(id), format!("word{id}"), format!("p{id}"), answers)
        .expect("valid question")
}

pub fn correct_of(id: u64) -> AnswerId {
    AnswerId::new(id * 10 + 1)
}

pub fn wrong_of(id: u64) -> AnswerId {
    AnswerId::new(id * 10 + 2)
}

// ─── Question API ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeQuestionApi {
    questions: Vec<Question>,
    fail: bool,
    delay: Option<Duration>,
}

impl FakeQuestionApi {
    pub fn with_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl QuestionApi for FakeQuestionApi {
    async fn questions_by_level(&self, _level_id: LevelId) -> Result<Vec<Question>, ApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ApiError::Unavailable("questions offline".into()));
        }
        Ok(self.questions.clone())
    }
}

// ─── Progress API ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeProgressApi {
    levels: LevelList,
    fail_levels: bool,
    submit_result: Option<SubmissionResult>,
    fail_legacy: bool,
    incorrect: Vec<Question>,
    pub submissions: Arc<Mutex<Vec<QuizSubmission>>>,
    pub legacy: Arc<Mutex<Vec<LegacyScore>>>,
}

impl FakeProgressApi {
    pub fn with_levels(mut self, levels: LevelList) -> Self {
        self.levels = levels;
        self
    }

    pub fn failing_levels(mut self) -> Self {
        self.fail_levels = true;
        self
    }

    /// Submissions succeed with `result`; without it they fail.
    pub fn accepting(mut self, result: SubmissionResult) -> Self {
        self.submit_result = Some(result);
        self
    }

    pub fn failing_legacy(mut self) -> Self {
        self.fail_legacy = true;
        self
    }

    pub fn with_incorrect(mut self, questions: Vec<Question>) -> Self {
        self.incorrect = questions;
        self
    }
}

#[async_trait]
impl ProgressApi for FakeProgressApi {
    async fn user_levels(&self) -> Result<LevelList, ApiError> {
        if self.fail_levels {
            return Err(ApiError::Unavailable("levels offline".into()));
        }
        Ok(self.levels.clone())
    }

    async fn submit_quiz(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionResult, ApiError> {
        self.submissions.lock().unwrap().push(submission.clone());
        self.submit_result
            .clone()
            .ok_or_else(|| ApiError::Unavailable("submit offline".into()))
    }

    async fn record_legacy_score(&self, score: &LegacyScore) -> Result<(), ApiError> {
        self.legacy.lock().unwrap().push(score.clone());
        if self.fail_legacy {
            return Err(ApiError::Unavailable("scores offline".into()));
        }
        Ok(())
    }

    async fn incorrect_questions(
        &self,
        _level_id: Option<LevelId>,
    ) -> Result<Vec<Question>, ApiError> {
        Ok(self.incorrect.clone())
    }
}

// ─── View ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Loading(LevelId),
    Question(QuestionPrompt),
    Feedback(AnswerFeedback),
    Summary(SummaryView),
    Submitting,
    Submitted(&'static str),
    NextLevel(LevelId),
    Error(String),
}

#[derive(Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl QuizView for RecordingView {
    fn show_loading(&self, level_id: LevelId) {
        self.push(ViewEvent::Loading(level_id));
    }

    fn show_question(&self, prompt: &QuestionPrompt) {
        self.push(ViewEvent::Question(prompt.clone()));
    }

    fn show_answer_feedback(&self, feedback: &AnswerFeedback) {
        self.push(ViewEvent::Feedback(feedback.clone()));
    }

    fn show_summary(&self, summary: &SummaryView) {
        self.push(ViewEvent::Summary(summary.clone()));
    }

    fn show_submitting(&self) {
        self.push(ViewEvent::Submitting);
    }

    fn show_submission(&self, report: &SubmissionReport) {
        self.push(ViewEvent::Submitted(report.tier));
    }

    fn show_next_level(&self, level_id: LevelId) {
        self.push(ViewEvent::NextLevel(level_id));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_owned()));
    }
}
