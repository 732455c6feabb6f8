use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use tracker_core::model::{
    Attempt, AttemptPatch, AttemptStatus, Difficulty, Problem, ProblemId, UserId,
    ValidatedAttempt, ValidatedProblem,
};

use crate::remote::{AttemptGateway, CatalogGateway, GatewayError};

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Connection settings for the REST backend.
#[derive(Clone, Debug)]
pub struct HttpGatewayConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpGatewayConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:5555/api";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Read settings from the environment, falling back to the development
    /// server defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("TRACKER_API_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.into());
        let timeout = env::var("TRACKER_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);
        Self {
            base_url,
            timeout: Duration::from_secs(timeout),
        }
    }
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

//
// ─── HTTP GATEWAY ──────────────────────────────────────────────────────────────
//

/// Gateway backed by the remote REST collection endpoints.
///
/// Session credentials ride along implicitly via the cookie store; every
/// request is bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a gateway from environment settings.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Transport` if the underlying client cannot be
    /// constructed.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::new(&HttpGatewayConfig::from_env())
    }

    /// Build a gateway from the given settings.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Transport` if the underlying client cannot be
    /// constructed.
    pub fn new(config: &HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(classify)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn classify(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, GatewayError> {
    if !response.status().is_success() {
        return Err(GatewayError::Status(response.status()));
    }
    Ok(response)
}

#[async_trait]
impl CatalogGateway for HttpGateway {
    async fn list_problems(&self) -> Result<Vec<Problem>, GatewayError> {
        let response = self
            .client
            .get(self.url("/problems"))
            .send()
            .await
            .map_err(classify)?;
        let payload: ProblemsPayload = check_status(response)?.json().await.map_err(classify)?;

        let records = payload.into_records();
        log::debug!("fetched {} catalog problems", records.len());
        records.into_iter().map(ProblemRecord::into_problem).collect()
    }

    async fn create_problem(&self, draft: &ValidatedProblem) -> Result<Problem, GatewayError> {
        let body = ProblemDraftBody {
            problem_name: &draft.name,
            problem_link: draft.link.as_str(),
            difficulty: draft.difficulty,
            category: &draft.category,
        };

        let response = self
            .client
            .post(self.url("/problems"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let record: ProblemRecord = check_status(response)?.json().await.map_err(classify)?;
        record.into_problem()
    }
}

#[async_trait]
impl AttemptGateway for HttpGateway {
    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<Attempt>, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/users/{user_id}/problems")))
            .send()
            .await
            .map_err(classify)?;
        let records: Vec<AttemptRecord> =
            check_status(response)?.json().await.map_err(classify)?;

        log::debug!("fetched {} attempts for user {user_id}", records.len());
        Ok(records.into_iter().map(AttemptRecord::into_attempt).collect())
    }

    async fn create_attempt(&self, attempt: &ValidatedAttempt) -> Result<Attempt, GatewayError> {
        let body = AttemptDraftBody {
            user_id: attempt.user_id.value(),
            problem_id: attempt.problem_id.value(),
            status: attempt.status,
            num_attempts: attempt.num_attempts,
            notes: &attempt.notes,
            date_attempted: attempt.date_attempted,
        };

        let response = self
            .client
            .post(self.url("/user-problems"))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let record: AttemptRecord = check_status(response)?.json().await.map_err(classify)?;
        Ok(record.into_attempt())
    }

    async fn update_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        patch: &AttemptPatch,
    ) -> Result<Attempt, GatewayError> {
        let body = AttemptPatchBody {
            status: patch.status,
            num_attempts: patch.num_attempts,
            notes: patch.notes.as_deref(),
        };

        let response = self
            .client
            .patch(self.url(&format!("/users/{user_id}/problems/{problem_id}")))
            .json(&body)
            .send()
            .await
            .map_err(classify)?;
        let record: AttemptRecord = check_status(response)?.json().await.map_err(classify)?;
        Ok(record.into_attempt())
    }

    async fn delete_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.url(&format!("/users/{user_id}/problems/{problem_id}")))
            .send()
            .await
            .map_err(classify)?;
        check_status(response)?;
        Ok(())
    }
}

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// `GET /problems` answers either a bare array or a paginated envelope; the
/// pagination metadata is ignored.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProblemsPayload {
    Bare(Vec<ProblemRecord>),
    Paginated { problems: Vec<ProblemRecord> },
}

impl ProblemsPayload {
    fn into_records(self) -> Vec<ProblemRecord> {
        match self {
            ProblemsPayload::Bare(records) | ProblemsPayload::Paginated { problems: records } => {
                records
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProblemRecord {
    id: u64,
    problem_name: String,
    problem_link: String,
    difficulty: Difficulty,
    category: String,
}

impl ProblemRecord {
    fn into_problem(self) -> Result<Problem, GatewayError> {
        let link = Url::parse(&self.problem_link).map_err(|err| {
            GatewayError::Decode(format!(
                "problem {} carries an invalid link: {err}",
                self.id
            ))
        })?;
        Ok(Problem::from_remote(
            ProblemId::new(self.id),
            self.problem_name,
            link,
            self.difficulty,
            self.category,
        ))
    }
}

#[derive(Debug, Serialize)]
struct ProblemDraftBody<'a> {
    problem_name: &'a str,
    problem_link: &'a str,
    difficulty: Difficulty,
    category: &'a str,
}

#[derive(Debug, Deserialize)]
struct AttemptRecord {
    user_id: u64,
    problem_id: u64,
    status: AttemptStatus,
    #[serde(default = "default_num_attempts")]
    num_attempts: u32,
    notes: Option<String>,
    date_attempted: NaiveDate,
}

fn default_num_attempts() -> u32 {
    1
}

impl AttemptRecord {
    fn into_attempt(self) -> Attempt {
        Attempt {
            user_id: UserId::new(self.user_id),
            problem_id: ProblemId::new(self.problem_id),
            status: self.status,
            num_attempts: self.num_attempts,
            notes: self.notes.unwrap_or_default(),
            date_attempted: self.date_attempted,
        }
    }
}

#[derive(Debug, Serialize)]
struct AttemptDraftBody<'a> {
    user_id: u64,
    problem_id: u64,
    status: AttemptStatus,
    num_attempts: u32,
    notes: &'a str,
    date_attempted: NaiveDate,
}

#[derive(Debug, Serialize)]
struct AttemptPatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<AttemptStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
