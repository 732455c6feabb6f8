use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use tracker_core::model::{
    Attempt, AttemptPatch, Problem, ProblemId, UserId, ValidatedAttempt, ValidatedProblem,
};

/// Errors surfaced by remote gateway adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Remote contract for the shared problem catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport, status or decode failures; a
    /// response with any malformed record fails wholesale.
    async fn list_problems(&self) -> Result<Vec<Problem>, GatewayError>;

    /// Submit a validated problem draft; the server assigns the identity.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the submission fails.
    async fn create_problem(&self, draft: &ValidatedProblem) -> Result<Problem, GatewayError>;
}

/// Remote contract for per-user attempt records.
#[async_trait]
pub trait AttemptGateway: Send + Sync {
    /// Fetch every attempt record belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` on transport, status or decode failures.
    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<Attempt>, GatewayError>;

    /// Submit a validated attempt draft.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the submission fails; the server rejects
    /// duplicate `(user, problem)` pairs with a status error.
    async fn create_attempt(&self, attempt: &ValidatedAttempt) -> Result<Attempt, GatewayError>;

    /// Patch the record identified by the key and return the updated copy.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the patch fails or the key is unknown
    /// remotely.
    async fn update_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        patch: &AttemptPatch,
    ) -> Result<Attempt, GatewayError>;

    /// Delete the record identified by the key; no content on success.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the deletion fails or the key is unknown
    /// remotely.
    async fn delete_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> Result<(), GatewayError>;
}

//
// ─── IN-MEMORY GATEWAY ─────────────────────────────────────────────────────────
//

/// In-memory gateway double for tests and prototyping.
///
/// Mimics the remote collection semantics: monotonic id assignment on problem
/// creation, duplicate-key rejection on attempt creation, 404-style status
/// errors for unknown keys. Tracks a total call count and supports one-shot
/// failure injection for exercising refresh-failure paths.
pub struct InMemoryGateway {
    problems: Mutex<Vec<Problem>>,
    attempts: Mutex<Vec<Attempt>>,
    next_problem_id: AtomicU64,
    calls: AtomicUsize,
    planned_failures: Mutex<Vec<(usize, GatewayError)>>,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            problems: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            next_problem_id: AtomicU64::new(1),
            calls: AtomicUsize::new(0),
            planned_failures: Mutex::new(Vec::new()),
        }
    }

    /// Replace the remote catalog contents, advancing the id sequence past
    /// the highest seeded id.
    pub fn seed_problems(&self, problems: Vec<Problem>) {
        let next = problems
            .iter()
            .map(|p| p.id().value() + 1)
            .max()
            .unwrap_or(1);
        self.next_problem_id.store(next, Ordering::SeqCst);
        *lock(&self.problems) = problems;
    }

    /// Replace the remote attempt contents.
    pub fn seed_attempts(&self, attempts: Vec<Attempt>) {
        *lock(&self.attempts) = attempts;
    }

    /// Number of gateway calls made so far, across all endpoints.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next call fail with `error` instead of reaching the store.
    pub fn fail_next_call(&self, error: GatewayError) {
        self.fail_call_in(1, error);
    }

    /// Make the `nth` upcoming call fail (1 = the next call), so a failure
    /// can be aimed past the write at the refresh that follows it.
    pub fn fail_call_in(&self, nth: usize, error: GatewayError) {
        let at = self.calls.load(Ordering::SeqCst) + nth.max(1) - 1;
        lock(&self.planned_failures).push((at, error));
    }

    fn begin(&self) -> Result<(), GatewayError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let mut planned = lock(&self.planned_failures);
        if let Some(position) = planned.iter().position(|(at, _)| *at == index) {
            return Err(planned.swap_remove(position).1);
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl CatalogGateway for InMemoryGateway {
    async fn list_problems(&self) -> Result<Vec<Problem>, GatewayError> {
        self.begin()?;
        Ok(lock(&self.problems).clone())
    }

    async fn create_problem(&self, draft: &ValidatedProblem) -> Result<Problem, GatewayError> {
        self.begin()?;
        let id = ProblemId::new(self.next_problem_id.fetch_add(1, Ordering::SeqCst));
        let problem = draft.clone().assign_id(id);
        lock(&self.problems).push(problem.clone());
        Ok(problem)
    }
}

#[async_trait]
impl AttemptGateway for InMemoryGateway {
    async fn list_attempts(&self, user_id: UserId) -> Result<Vec<Attempt>, GatewayError> {
        self.begin()?;
        Ok(lock(&self.attempts)
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_attempt(&self, attempt: &ValidatedAttempt) -> Result<Attempt, GatewayError> {
        self.begin()?;
        let mut attempts = lock(&self.attempts);
        let duplicate = attempts
            .iter()
            .any(|a| a.user_id == attempt.user_id && a.problem_id == attempt.problem_id);
        if duplicate {
            return Err(GatewayError::Status(reqwest::StatusCode::BAD_REQUEST));
        }

        let record = Attempt {
            user_id: attempt.user_id,
            problem_id: attempt.problem_id,
            status: attempt.status,
            num_attempts: attempt.num_attempts,
            notes: attempt.notes.clone(),
            date_attempted: attempt.date_attempted,
        };
        attempts.push(record.clone());
        Ok(record)
    }

    async fn update_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        patch: &AttemptPatch,
    ) -> Result<Attempt, GatewayError> {
        self.begin()?;
        let mut attempts = lock(&self.attempts);
        let Some(existing) = attempts
            .iter_mut()
            .find(|a| a.user_id == user_id && a.problem_id == problem_id)
        else {
            return Err(GatewayError::Status(reqwest::StatusCode::NOT_FOUND));
        };

        *existing = patch.apply_to(existing);
        Ok(existing.clone())
    }

    async fn delete_attempt(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> Result<(), GatewayError> {
        self.begin()?;
        let mut attempts = lock(&self.attempts);
        let before = attempts.len();
        attempts.retain(|a| !(a.user_id == user_id && a.problem_id == problem_id));
        if attempts.len() == before {
            return Err(GatewayError::Status(reqwest::StatusCode::NOT_FOUND));
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
