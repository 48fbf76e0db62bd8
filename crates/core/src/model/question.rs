use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AnswerId, LevelId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question word cannot be empty")]
    EmptyWord,

    #[error("question needs at least 2 answers, got {count}")]
    TooFewAnswers { count: usize },
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// One answer choice, shown in both Thai and English.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    id: AnswerId,
    thai_text: String,
    english_text: String,
    #[serde(default)]
    is_correct: bool,
}

impl Answer {
    #[must_use]
    pub fn new(
        id: AnswerId,
        thai_text: impl Into<String>,
        english_text: impl Into<String>,
        is_correct: bool,
    ) -> Self {
        Self {
            id,
            thai_text: thai_text.into(),
            english_text: english_text.into(),
            is_correct,
        }
    }

    #[must_use]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    #[must_use]
    pub fn thai_text(&self) -> &str {
        &self.thai_text
    }

    #[must_use]
    pub fn english_text(&self) -> &str {
        &self.english_text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A vocabulary question as served by the questions-by-level endpoint.
///
/// Deserialization is lenient: a question whose answers do not
/// contain exactly one correct choice is still accepted, and callers must
/// handle `correct_answer()` returning `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    word: String,
    #[serde(default)]
    pronunciation: String,
    #[serde(default)]
    sound_file: Option<String>,
    #[serde(default)]
    level: Option<LevelId>,
    #[serde(default)]
    answers: Vec<Answer>,
}

impl Question {
    /// Build a question from parts.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyWord` for a blank word and
    /// `QuestionError::TooFewAnswers` when fewer than two answers are given.
    pub fn new(
        id: QuestionId,
        word: impl Into<String>,
        pronunciation: impl Into<String>,
        answers: Vec<Answer>,
    ) -> Result<Self, QuestionError> {
        let word = word.into();
        if word.trim().is_empty() {
            return Err(QuestionError::EmptyWord);
        }
        if answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers {
                count: answers.len(),
            });
        }

        Ok(Self {
            id,
            word,
            pronunciation: pronunciation.into(),
            sound_file: None,
            level: None,
            answers,
        })
    }

    #[must_use]
    pub fn with_level(mut self, level: LevelId) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_sound_file(mut self, sound_file: impl Into<String>) -> Self {
        self.sound_file = Some(sound_file.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn pronunciation(&self) -> &str {
        &self.pronunciation
    }

    #[must_use]
    pub fn sound_file(&self) -> Option<&str> {
        self.sound_file.as_deref()
    }

    #[must_use]
    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.id == id)
    }

    /// First answer flagged as correct, if the data has one.
    #[must_use]
    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.is_correct)
    }

    /// Whether the answer set satisfies the single-correct-answer invariant.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.answers.len() >= 2 && self.answers.iter().filter(|a| a.is_correct).count() == 1
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// Ordered questions for one level; fixed for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    level_id: LevelId,
    questions: Vec<Question>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(level_id: LevelId, questions: Vec<Question>) -> Self {
        Self {
            level_id,
            questions,
        }
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}
