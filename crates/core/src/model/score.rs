use crate::model::ids::LevelId;

/// Minimum percentage the server treats as a pass.
pub const PASS_PERCENTAGE: u32 = 80;

/// `score / total` as a whole percentage, rounded half up. Zero when `total` is zero.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = u64::from(score.min(total));
    let total = u64::from(total);
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(100)
}

/// Final tally for a finished quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSummary {
    level_id: LevelId,
    score: u32,
    total: u32,
}

impl QuizSummary {
    #[must_use]
    pub fn new(level_id: LevelId, score: u32, total: u32) -> Self {
        Self {
            level_id,
            score: score.min(total),
            total,
        }
    }

    #[must_use]
    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    /// Local estimate of the server's pass rule; the submission result is authoritative.
    #[must_use]
    pub fn passes_threshold(&self) -> bool {
        self.total > 0 && u64::from(self.score) * 100 >= u64::from(PASS_PERCENTAGE) * u64::from(self.total)
    }
}
