mod strategy;
mod submitter;

pub use crate::error::{StrategyError, SubmissionError, TierFailure};
pub use strategy::{
    DirectSubmitStrategy, LegacyScoreStrategy, ProgressServiceStrategy, SubmissionOutcome,
    SubmissionStrategy,
};
pub use submitter::{ProgressSubmitter, SubmissionReport};
