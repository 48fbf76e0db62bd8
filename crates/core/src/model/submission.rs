use serde::{Deserialize, Serialize};

use crate::model::attempt::Attempt;
use crate::model::ids::LevelId;

/// Body of the progress submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub level_id: LevelId,
    pub answers: Vec<Attempt>,
}

impl QuizSubmission {
    #[must_use]
    pub fn new(level_id: LevelId, answers: Vec<Attempt>) -> Self {
        Self { level_id, answers }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        let correct = self.answers.iter().filter(|a| a.is_correct()).count();
        u32::try_from(correct).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        u32::try_from(self.answers.len()).unwrap_or(u32::MAX)
    }
}

/// Normalized response of a structured submission.
///
/// The server answers with a progress record (`percentage_score`, `score`,
/// `max_score`, ...); only the fields the client acts on are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub has_passed: bool,
    #[serde(default, alias = "percentage_score")]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub next_level_id: Option<LevelId>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub max_score: Option<u32>,
}

impl SubmissionResult {
    #[must_use]
    pub fn passed(percentage: Option<f64>) -> Self {
        Self {
            has_passed: true,
            percentage,
            next_level_id: None,
            score: None,
            max_score: None,
        }
    }

    #[must_use]
    pub fn failed(percentage: Option<f64>) -> Self {
        Self {
            has_passed: false,
            ..Self::passed(percentage)
        }
    }

    #[must_use]
    pub fn with_next_level(mut self, next: LevelId) -> Self {
        self.next_level_id = Some(next);
        self
    }
}

/// Record accepted by the older scores endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyScore {
    pub player_name: Option<String>,
    pub score: u32,
    pub max_score: u32,
    pub level: LevelId,
}

impl LegacyScore {
    #[must_use]
    pub fn from_submission(submission: &QuizSubmission, player_name: Option<String>) -> Self {
        Self {
            player_name,
            score: submission.score(),
            max_score: submission.max_score(),
            level: submission.level_id,
        }
    }
}
