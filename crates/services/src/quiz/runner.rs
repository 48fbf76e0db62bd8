use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{AnswerId, Attempt, LevelId, Question, QuestionSet, QuizSummary};

use super::DEFAULT_FETCH_TIMEOUT;
use super::state::{QuizPhase, QuizProgress, SessionState};
use super::view::{
    AnswerFeedback, LOAD_FAILED_MESSAGE, NO_QUESTIONS_MESSAGE, QuestionPrompt, QuizView,
    SUBMIT_FAILED_MESSAGE, SummaryView,
};
use crate::Clock;
use crate::api::QuestionApi;
use crate::error::{QuizError, SubmissionError};
use crate::progress::{ProgressSubmitter, SubmissionReport};

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// What happened to the submission when the quiz finished.
#[derive(Debug)]
pub enum SubmissionStatus {
    Submitted(SubmissionReport),
    /// Every tier failed; the summary is still valid.
    Failed(SubmissionError),
    /// `finish` ran before; nothing was sent this time.
    AlreadySubmitted,
}

#[derive(Debug)]
pub struct QuizReport {
    pub summary: QuizSummary,
    pub submission: SubmissionStatus,
}

/// Outcome of `QuizRunner::advance`.
#[derive(Debug)]
pub enum Advance {
    Presented(QuizProgress),
    Finished(QuizReport),
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Drives one quiz for one level.
///
/// A runner is single-use: once `Finished` it stays there, and a retry builds
/// a new runner.
pub struct QuizRunner {
    questions_api: Arc<dyn QuestionApi>,
    submitter: Arc<ProgressSubmitter>,
    view: Arc<dyn QuizView>,
    clock: Clock,
    fetch_timeout: Duration,
    phase: QuizPhase,
    questions: Option<QuestionSet>,
    state: Option<SessionState>,
    summary: Option<QuizSummary>,
}

impl QuizRunner {
    #[must_use]
    pub fn new(
        questions_api: Arc<dyn QuestionApi>,
        submitter: Arc<ProgressSubmitter>,
        view: Arc<dyn QuizView>,
    ) -> Self {
        Self {
            questions_api,
            submitter,
            view,
            clock: Clock::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            phase: QuizPhase::Loading,
            questions: None,
            state: None,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn level_id(&self) -> Option<LevelId> {
        self.state.as_ref().map(SessionState::level_id)
    }

    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn attempts(&self) -> &[Attempt] {
        self.state
            .as_ref()
            .map(SessionState::attempts)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.as_ref().map_or(0, SessionState::score)
    }

    #[must_use]
    pub fn progress(&self) -> Option<QuizProgress> {
        self.state.as_ref().map(SessionState::progress)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let index = self.state.as_ref()?.current_index();
        self.questions.as_ref()?.get(index)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&QuizSummary> {
        self.summary.as_ref()
    }

    /// Fetch the questions for `level_id` and present the first one.
    ///
    /// On failure the runner stays in `Loading` and the view shows the error.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Timeout` if the fetch exceeds the configured bound,
    /// `QuizError::Fetch` on API failure, `QuizError::NoQuestions` for an empty
    /// level, `QuizError::MalformedQuestion` if a question offers fewer than
    /// two answers and `QuizError::AlreadyStarted` if questions were already
    /// loaded.
    pub async fn start(&mut self, level_id: LevelId) -> Result<QuestionPrompt, QuizError> {
        if self.phase != QuizPhase::Loading || self.state.is_some() {
            return Err(QuizError::AlreadyStarted);
        }
        self.view.show_loading(level_id);

        let timeout = self.fetch_timeout;
        let fetched =
            tokio::time::timeout(timeout, self.questions_api.questions_by_level(level_id)).await;
        let questions = match fetched {
            Err(_) => {
                tracing::error!(%level_id, ?timeout, "question fetch timed out");
                self.view.show_error(LOAD_FAILED_MESSAGE);
                return Err(QuizError::Timeout { after: timeout });
            }
            Ok(Err(err)) => {
                tracing::error!(%level_id, error = %err, "question fetch failed");
                self.view.show_error(LOAD_FAILED_MESSAGE);
                return Err(err.into());
            }
            Ok(Ok(questions)) => questions,
        };

        if questions.is_empty() {
            tracing::warn!(%level_id, "level has no questions");
            self.view.show_error(NO_QUESTIONS_MESSAGE);
            return Err(QuizError::NoQuestions { level_id });
        }
        if let Some(bad) = questions.iter().find(|q| q.answers().len() < 2) {
            let question_id = bad.id();
            tracing::error!(
                %level_id,
                %question_id,
                answers = bad.answers().len(),
                "question cannot be answered"
            );
            self.view.show_error(LOAD_FAILED_MESSAGE);
            return Err(QuizError::MalformedQuestion { question_id });
        }

        tracing::info!(%level_id, count = questions.len(), "quiz started");
        let set = QuestionSet::new(level_id, questions);
        self.state = Some(SessionState::new(level_id, set.len(), self.clock.now()));
        self.questions = Some(set);
        self.phase = QuizPhase::InProgress;
        self.present_current()
    }

    /// Render the current question without changing state.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` outside the `InProgress` phase.
    pub fn present_current(&self) -> Result<QuestionPrompt, QuizError> {
        let (question, state) = self.current()?;
        if !question.is_well_formed() {
            tracing::warn!(question_id = %question.id(), "question has no single correct answer");
        }
        let prompt = QuestionPrompt::build(question, state.progress());
        self.view.show_question(&prompt);
        Ok(prompt)
    }

    /// Record the user's choice for the current question.
    ///
    /// Returns `Ok(None)` when the question was already answered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownAnswer` if `answer_id` is not one of the
    /// current question's answers, `QuizError::NotInProgress` otherwise.
    pub fn select_answer(
        &mut self,
        answer_id: AnswerId,
    ) -> Result<Option<AnswerFeedback>, QuizError> {
        let (question, state) = self.current()?;
        if state.is_current_answered() {
            tracing::debug!(question_id = %question.id(), "ignoring second answer");
            return Ok(None);
        }
        let answer = question
            .answer(answer_id)
            .ok_or(QuizError::UnknownAnswer(answer_id))?;

        let feedback = AnswerFeedback {
            question_id: question.id(),
            selected: answer_id,
            correct: question.correct_answer().map(|a| a.id()),
            is_correct: answer.is_correct(),
        };
        let attempt = Attempt::new(question.id(), answer_id, feedback.is_correct);

        let state = self.state.as_mut().ok_or(QuizError::NotInProgress)?;
        state.record(attempt);
        self.view.show_answer_feedback(&feedback);
        Ok(Some(feedback))
    }

    /// Move on after an answer; finishes the quiz after the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Unanswered` if the current question has no answer
    /// yet, `QuizError::NotInProgress` outside the `InProgress` phase.
    pub async fn advance(&mut self) -> Result<Advance, QuizError> {
        let (_, state) = self.current()?;
        if !state.is_current_answered() {
            return Err(QuizError::Unanswered);
        }

        let state = self.state.as_mut().ok_or(QuizError::NotInProgress)?;
        if state.advance() {
            let prompt = self.present_current()?;
            return Ok(Advance::Presented(prompt.progress));
        }
        self.finish().await.map(Advance::Finished)
    }

    /// Score the quiz, show the summary and submit it once.
    ///
    /// A second call returns the same summary with
    /// `SubmissionStatus::AlreadySubmitted`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` if the quiz never started and
    /// `QuizError::Unanswered` while questions remain unanswered.
    pub async fn finish(&mut self) -> Result<QuizReport, QuizError> {
        let total = self.questions.as_ref().map_or(0, QuestionSet::len);
        let state = self.state.as_mut().ok_or(QuizError::NotInProgress)?;
        if state.attempts().len() < total {
            return Err(QuizError::Unanswered);
        }

        state.finish(self.clock.now());
        self.phase = QuizPhase::Finished;
        let summary = state.summary();
        self.summary = Some(summary);

        if !state.mark_submitted() {
            return Ok(QuizReport {
                summary,
                submission: SubmissionStatus::AlreadySubmitted,
            });
        }

        tracing::info!(
            level_id = %summary.level_id(),
            score = summary.score(),
            total = summary.total(),
            percentage = summary.percentage(),
            "quiz finished"
        );
        self.view.show_summary(&SummaryView::from_summary(&summary));

        let submission = state.submission();
        self.view.show_submitting();
        let status = match self.submitter.submit(&submission).await {
            Ok(report) => {
                self.view.show_submission(&report);
                if report.has_passed() {
                    if let Some(next) = report.next_level_id() {
                        self.view.show_next_level(next);
                    }
                }
                SubmissionStatus::Submitted(report)
            }
            Err(err) => {
                tracing::error!(error = %err, "quiz result was not recorded");
                self.view.show_error(SUBMIT_FAILED_MESSAGE);
                SubmissionStatus::Failed(err)
            }
        };

        Ok(QuizReport {
            summary,
            submission: status,
        })
    }

    fn current(&self) -> Result<(&Question, &SessionState), QuizError> {
        if self.phase != QuizPhase::InProgress {
            return Err(QuizError::NotInProgress);
        }
        let state = self.state.as_ref().ok_or(QuizError::NotInProgress)?;
        let question = self
            .questions
            .as_ref()
            .and_then(|set| set.get(state.current_index()))
            .ok_or(QuizError::NotInProgress)?;
        Ok((question, state))
    }
}

impl fmt::Debug for QuizRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRunner")
            .field("phase", &self.phase)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("questions_len", &self.questions.as_ref().map(QuestionSet::len))
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use quiz_core::model::{LevelList, QuizSubmission, SubmissionResult};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemoryRepository, LocalStore};

    use crate::levels::LevelService;
    use crate::progress::{LegacyScoreStrategy, ProgressServiceStrategy, SubmissionStrategy};
    use crate::testing::{
        FakeProgressApi, FakeQuestionApi, RecordingView, ViewEvent, correct_of, level, question,
        wrong_of,
    };

    struct Harness {
        runner: QuizRunner,
        view: RecordingView,
        submissions: Arc<Mutex<Vec<QuizSubmission>>>,
        store: InMemoryRepository,
    }

    fn harness(questions: FakeQuestionApi, progress: FakeProgressApi) -> Harness {
        let submissions = Arc::clone(&progress.submissions);
        let store = InMemoryRepository::new();
        let levels = Arc::new(LevelService::new(
            Arc::new(FakeProgressApi::default()),
            Arc::new(store.clone()),
        ));
        levels.replace_cache(LevelList::new(vec![level(1, 1), level(2, 2), level(3, 3)]));
        let progress: Arc<FakeProgressApi> = Arc::new(progress);
        let strategies: Vec<Arc<dyn SubmissionStrategy>> = vec![
            Arc::new(ProgressServiceStrategy::new(progress.clone())),
            Arc::new(LegacyScoreStrategy::new(progress, None)),
        ];
        let submitter = Arc::new(
            ProgressSubmitter::new(strategies, levels).with_refresh_delay(Duration::from_millis(1)),
        );
        let view = RecordingView::default();
        let runner = QuizRunner::new(Arc::new(questions), submitter, Arc::new(view.clone()))
            .with_clock(fixed_clock());
        Harness {
            runner,
            view,
            submissions,
            store,
        }
    }

    fn three_questions() -> FakeQuestionApi {
        FakeQuestionApi::with_questions(vec![
            question(1, Some(1)),
            question(2, Some(1)),
            question(3, Some(1)),
        ])
    }

    #[tokio::test]
    async fn start_presents_first_question() {
        let mut h = harness(three_questions(), FakeProgressApi::default());

        let prompt = h.runner.start(LevelId::new(1)).await.unwrap();
        assert_eq!(prompt.heading, "1. word1 (p1)");
        assert_eq!(prompt.progress.label(), "Question 1 of 3");
        assert_eq!(h.runner.phase(), QuizPhase::InProgress);
        assert_eq!(h.runner.score(), 0);
        assert_eq!(h.runner.state().map(SessionState::started_at), Some(fixed_now()));

        let events = h.view.events();
        assert_eq!(events[0], ViewEvent::Loading(LevelId::new(1)));
        assert!(matches!(events[1], ViewEvent::Question(_)));
    }

    #[tokio::test]
    async fn correct_wrong_correct_scores_two_of_three() {
        let progress = FakeProgressApi::default().accepting(SubmissionResult::failed(Some(66.67)));
        let mut h = harness(three_questions(), progress);
        h.runner.start(LevelId::new(1)).await.unwrap();

        let picks = [correct_of(1), wrong_of(2), correct_of(3)];
        let mut finished = None;
        for pick in picks {
            h.runner.select_answer(pick).unwrap().unwrap();
            if let Advance::Finished(report) = h.runner.advance().await.unwrap() {
                finished = Some(report);
            }
        }

        let report = finished.expect("quiz finished");
        assert_eq!(report.summary.score(), 2);
        assert_eq!(report.summary.total(), 3);
        assert_eq!(report.summary.percentage(), 67);
        assert_eq!(h.runner.phase(), QuizPhase::Finished);

        let attempts = h.runner.attempts();
        assert_eq!(attempts.len(), 3);
        let order: Vec<_> = attempts.iter().map(|a| a.question_id().value()).collect();
        assert_eq!(order, vec![1, 2, 3]);
        let correctness: Vec<_> = attempts.iter().map(Attempt::is_correct).collect();
        assert_eq!(correctness, vec![true, false, true]);

        let sent = h.submissions.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].answers.len(), 3);
        assert!(matches!(report.submission, SubmissionStatus::Submitted(_)));
    }

    #[tokio::test]
    async fn score_never_decreases() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let mut last = 0;
        for pick in [wrong_of(1), correct_of(2), wrong_of(3)] {
            h.runner.select_answer(pick).unwrap();
            assert!(h.runner.score() >= last);
            last = h.runner.score();
            h.runner.advance().await.unwrap();
        }
        assert_eq!(last, 1);
    }

    #[tokio::test]
    async fn second_selection_is_ignored() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let first = h.runner.select_answer(wrong_of(1)).unwrap();
        let second = h.runner.select_answer(correct_of(1)).unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(h.runner.attempts().len(), 1);
        assert_eq!(h.runner.score(), 0);
    }

    #[tokio::test]
    async fn wrong_answer_reveals_correct_one() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let feedback = h.runner.select_answer(wrong_of(1)).unwrap().unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct, Some(correct_of(1)));
        assert!(matches!(h.view.events().last(), Some(ViewEvent::Feedback(_))));
    }

    #[tokio::test]
    async fn unknown_answer_records_nothing() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let err = h.runner.select_answer(AnswerId::new(999)).unwrap_err();
        assert!(matches!(err, QuizError::UnknownAnswer(id) if id == AnswerId::new(999)));
        assert!(h.runner.attempts().is_empty());
    }

    #[tokio::test]
    async fn question_without_correct_answer_scores_incorrect() {
        let api = FakeQuestionApi::with_questions(vec![question(1, None)]);
        let mut h = harness(api, FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let feedback = h.runner.select_answer(correct_of(1)).unwrap().unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct, None);
        assert_eq!(h.runner.score(), 0);
    }

    #[tokio::test]
    async fn advance_requires_an_answer() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();

        let err = h.runner.advance().await.unwrap_err();
        assert!(matches!(err, QuizError::Unanswered));
        assert_eq!(h.runner.progress().map(|p| p.current), Some(1));
    }

    #[tokio::test]
    async fn empty_question_set_stays_loading() {
        let mut h = harness(FakeQuestionApi::default(), FakeProgressApi::default());

        let err = h.runner.start(LevelId::new(4)).await.unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions { level_id } if level_id == LevelId::new(4)));
        assert_eq!(h.runner.phase(), QuizPhase::Loading);
        assert!(h.runner.attempts().is_empty());
        assert_eq!(
            h.view.events().last(),
            Some(&ViewEvent::Error(NO_QUESTIONS_MESSAGE.to_owned()))
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_reported() {
        let mut h = harness(FakeQuestionApi::failing(), FakeProgressApi::default());

        let err = h.runner.start(LevelId::new(1)).await.unwrap_err();
        assert!(matches!(err, QuizError::Fetch(_)));
        assert_eq!(h.runner.phase(), QuizPhase::Loading);
        assert_eq!(
            h.view.events().last(),
            Some(&ViewEvent::Error(LOAD_FAILED_MESSAGE.to_owned()))
        );
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let api = three_questions().slow(Duration::from_millis(500));
        let mut h = harness(api, FakeProgressApi::default());
        h.runner = h.runner.with_fetch_timeout(Duration::from_millis(20));

        let err = h.runner.start(LevelId::new(1)).await.unwrap_err();
        assert!(matches!(err, QuizError::Timeout { after } if after == Duration::from_millis(20)));
        assert_eq!(err.to_string(), "loading questions timed out after 20ms");
        assert_eq!(h.runner.phase(), QuizPhase::Loading);
    }

    #[tokio::test]
    async fn question_without_answers_is_rejected_at_start() {
        let answerless: Question =
            serde_json::from_value(serde_json::json!({"id": 5, "word": "w5", "answers": []}))
                .unwrap();
        let api = FakeQuestionApi::with_questions(vec![question(1, Some(1)), answerless]);
        let mut h = harness(api, FakeProgressApi::default());

        let err = h.runner.start(LevelId::new(1)).await.unwrap_err();
        assert!(
            matches!(err, QuizError::MalformedQuestion { question_id } if question_id.value() == 5)
        );
        assert_eq!(h.runner.phase(), QuizPhase::Loading);
        assert!(h.runner.current_question().is_none());
        assert!(h.runner.attempts().is_empty());
        assert_eq!(
            h.view.events().last(),
            Some(&ViewEvent::Error(LOAD_FAILED_MESSAGE.to_owned()))
        );
    }

    #[tokio::test]
    async fn finish_twice_submits_once() {
        let api = FakeQuestionApi::with_questions(vec![question(1, Some(1))]);
        let progress = FakeProgressApi::default().accepting(SubmissionResult::failed(None));
        let mut h = harness(api, progress);
        h.runner.start(LevelId::new(1)).await.unwrap();
        h.runner.select_answer(correct_of(1)).unwrap();

        let first = h.runner.finish().await.unwrap();
        let second = h.runner.finish().await.unwrap();

        assert!(matches!(first.submission, SubmissionStatus::Submitted(_)));
        assert!(matches!(second.submission, SubmissionStatus::AlreadySubmitted));
        assert_eq!(first.summary, second.summary);
        assert_eq!(h.submissions.lock().unwrap().len(), 1);
        assert!(h.runner.state().is_some_and(SessionState::is_submitted));

        let events = h.view.events();
        let summaries = events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Summary(_)))
            .count();
        assert_eq!(summaries, 1);
        assert!(events.contains(&ViewEvent::Submitting));
        assert!(events.contains(&ViewEvent::Submitted("progress-service")));
    }

    #[tokio::test]
    async fn finish_before_last_answer_is_rejected() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();
        h.runner.select_answer(correct_of(1)).unwrap();

        let err = h.runner.finish().await.unwrap_err();
        assert!(matches!(err, QuizError::Unanswered));
        assert!(h.submissions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn passing_offers_and_stores_next_level() {
        let api = FakeQuestionApi::with_questions(vec![question(1, Some(1))]);
        let progress = FakeProgressApi::default().accepting(SubmissionResult::passed(Some(100.0)));
        let mut h = harness(api, progress);
        h.runner.start(LevelId::new(1)).await.unwrap();
        h.runner.select_answer(correct_of(1)).unwrap();

        let report = h.runner.finish().await.unwrap();
        let SubmissionStatus::Submitted(submitted) = report.submission else {
            panic!("expected a submission");
        };
        assert_eq!(submitted.next_level_id(), Some(LevelId::new(2)));
        assert!(h.view.events().contains(&ViewEvent::NextLevel(LevelId::new(2))));
        assert_eq!(h.store.current_level_id().await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn submission_failure_keeps_summary() {
        let api = FakeQuestionApi::with_questions(vec![question(1, Some(1))]);
        let progress = FakeProgressApi::default().failing_legacy();
        let mut h = harness(api, progress);
        h.runner.start(LevelId::new(1)).await.unwrap();
        h.runner.select_answer(correct_of(1)).unwrap();

        let report = h.runner.finish().await.unwrap();
        assert!(matches!(
            report.submission,
            SubmissionStatus::Failed(SubmissionError::Exhausted { .. })
        ));
        assert_eq!(h.runner.summary().map(QuizSummary::score), Some(1));
        let events = h.view.events();
        assert!(events.iter().any(|e| matches!(e, ViewEvent::Summary(_))));
        assert_eq!(
            events.last(),
            Some(&ViewEvent::Error(SUBMIT_FAILED_MESSAGE.to_owned()))
        );
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let mut h = harness(three_questions(), FakeProgressApi::default());
        h.runner.start(LevelId::new(1)).await.unwrap();
        let err = h.runner.start(LevelId::new(1)).await.unwrap_err();
        assert!(matches!(err, QuizError::AlreadyStarted));
    }
}
