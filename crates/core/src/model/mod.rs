mod attempt;
mod ids;
mod level;
mod question;
mod score;
mod submission;

pub use attempt::Attempt;
pub use ids::{AnswerId, LevelId, ParseIdError, QuestionId};
pub use level::{Level, LevelList};
pub use question::{Answer, Question, QuestionError, QuestionSet};
pub use score::{PASS_PERCENTAGE, QuizSummary, percentage};
pub use submission::{LegacyScore, QuizSubmission, SubmissionResult};
