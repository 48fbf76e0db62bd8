use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use quiz_core::model::{LegacyScore, LevelId, LevelList, Question, QuizSubmission, SubmissionResult};

use super::config::ApiConfig;
use super::csrf::CSRF_HEADER;
use super::{ProgressApi, QuestionApi};
use crate::error::ApiError;

const QUESTIONS_BY_LEVEL: &str = "api/questions/level";
const SUBMIT_QUIZ: &str = "api/progress/submit_quiz/";
const USER_LEVELS: &str = "api/progress/user_levels/";
const INCORRECT_QUESTIONS: &str = "api/progress/incorrect_questions/";
const LEGACY_SCORES: &str = "api/scores/";

/// `reqwest`-backed client for the vocabulary API.
///
/// Every request carries `X-Requested-With: XMLHttpRequest` and the configured
/// cookie; state-changing requests also echo the CSRF token. A missing token is
/// not checked here, the server rejects the request instead.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(CONTENT_TYPE, "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        match self.config.cookie() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint(path)?;
        Ok(self.with_session(self.client.get(url)))
    }

    fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<RequestBuilder, ApiError> {
        let url = self.config.endpoint(path)?;
        let request = self.with_session(self.client.post(url)).json(body);
        Ok(match self.config.csrf_token() {
            Some(token) => request.header(CSRF_HEADER, token),
            None => {
                tracing::debug!("no csrf token available, sending request without one");
                request
            }
        })
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "api request rejected");
            return Err(ApiError::HttpStatus(status));
        }
        Ok(response)
    }

    async fn send_json<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, ApiError> {
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuestionApi for HttpApi {
    async fn questions_by_level(&self, level_id: LevelId) -> Result<Vec<Question>, ApiError> {
        let path = format!("{QUESTIONS_BY_LEVEL}/{level_id}/");
        let request = self.get(&path)?.query(&[("format", "json")]);
        let questions: Vec<Question> = Self::send_json(request).await?;
        tracing::debug!(%level_id, count = questions.len(), "fetched questions");
        Ok(questions)
    }
}

#[async_trait]
impl ProgressApi for HttpApi {
    async fn user_levels(&self) -> Result<LevelList, ApiError> {
        let levels: LevelList = Self::send_json(self.get(USER_LEVELS)?).await?;
        tracing::debug!(count = levels.len(), "fetched user levels");
        Ok(levels)
    }

    async fn submit_quiz(
        &self,
        submission: &QuizSubmission,
    ) -> Result<SubmissionResult, ApiError> {
        let request = self.post(SUBMIT_QUIZ, submission)?;
        let result: SubmissionResult = Self::send_json(request).await?;
        tracing::debug!(
            level_id = %submission.level_id,
            has_passed = result.has_passed,
            "quiz submitted"
        );
        Ok(result)
    }

    async fn record_legacy_score(&self, score: &LegacyScore) -> Result<(), ApiError> {
        Self::send(self.post(LEGACY_SCORES, score)?).await?;
        Ok(())
    }

    async fn incorrect_questions(
        &self,
        level_id: Option<LevelId>,
    ) -> Result<Vec<Question>, ApiError> {
        let mut request = self.get(INCORRECT_QUESTIONS)?;
        if let Some(level_id) = level_id {
            request = request.query(&[("level_id", level_id.to_string())]);
        }
        Self::send_json(request).await
    }
}
