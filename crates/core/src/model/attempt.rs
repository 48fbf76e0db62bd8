use serde::{Deserialize, Serialize};

use crate::model::ids::{AnswerId, QuestionId};

/// A single answered question; the wire shape of one entry in `answers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    question_id: QuestionId,
    answer_id: AnswerId,
    is_correct: bool,
}

impl Attempt {
    #[must_use]
    pub fn new(question_id: QuestionId, answer_id: AnswerId, is_correct: bool) -> Self {
        Self {
            question_id,
            answer_id,
            is_correct,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn answer_id(&self) -> AnswerId {
        self.answer_id
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}
