use quiz_core::model::{Answer, AnswerId, LevelId, Question, QuestionId, QuizSummary};

use super::state::QuizProgress;
use crate::progress::SubmissionReport;

pub const INSTRUCTION: &str = "Select the correct meaning.";
pub const NO_QUESTIONS_MESSAGE: &str = "No question found in the system";
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load question. Please try again.";
pub const SUBMIT_FAILED_MESSAGE: &str = "Unable to record your score. Please try again later.";

/// Rendering side of the quiz. Implementations draw; they never mutate quiz state.
pub trait QuizView: Send + Sync {
    fn show_loading(&self, level_id: LevelId);
    fn show_question(&self, prompt: &QuestionPrompt);
    fn show_answer_feedback(&self, feedback: &AnswerFeedback);
    fn show_summary(&self, summary: &SummaryView);
    fn show_submitting(&self);
    fn show_submission(&self, report: &SubmissionReport);
    /// Offer navigation to a freshly unlocked level.
    fn show_next_level(&self, level_id: LevelId);
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub answer_id: AnswerId,
    pub label: String,
}

impl ChoiceView {
    #[must_use]
    pub fn from_answer(answer: &Answer) -> Self {
        Self {
            answer_id: answer.id(),
            label: answer_label(answer),
        }
    }
}

/// Everything needed to draw one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPrompt {
    pub question_id: QuestionId,
    pub number: usize,
    pub heading: String,
    pub instruction: &'static str,
    pub choices: Vec<ChoiceView>,
    pub audio: Option<String>,
    pub progress: QuizProgress,
}

impl QuestionPrompt {
    #[must_use]
    pub fn build(question: &Question, progress: QuizProgress) -> Self {
        Self {
            question_id: question.id(),
            number: progress.current,
            heading: question_heading(progress.current, question),
            instruction: INSTRUCTION,
            choices: question.answers().iter().map(ChoiceView::from_answer).collect(),
            audio: question.sound_file().map(str::to_owned),
            progress,
        }
    }
}

/// Result of picking an answer: the chosen one, and the correct one to reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_id: QuestionId,
    pub selected: AnswerId,
    pub correct: Option<AnswerId>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub heading: String,
    pub message: String,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
}

impl SummaryView {
    #[must_use]
    pub fn from_summary(summary: &QuizSummary) -> Self {
        let heading = if summary.passes_threshold() {
            "Level completed!"
        } else {
            "Quiz finished"
        };
        Self {
            heading: heading.to_owned(),
            message: score_message(summary.score(), summary.total()),
            score: summary.score(),
            total: summary.total(),
            percentage: summary.percentage(),
        }
    }
}

/// `"{n}. {word} ({pronunciation})"`
#[must_use]
pub fn question_heading(number: usize, question: &Question) -> String {
    format!("{number}. {} ({})", question.word(), question.pronunciation())
}

/// `"{thai} ({english})"`
#[must_use]
pub fn answer_label(answer: &Answer) -> String {
    format!("{} ({})", answer.thai_text(), answer.english_text())
}

#[must_use]
pub fn score_message(score: u32, total: u32) -> String {
    format!("Your score is {score} out of {total}!")
}
