use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracker_core::model::{
    Attempt, AttemptDraft, AttemptPatch, Problem, ProblemDraft, ProblemId, UserId,
};
use tracker_core::Clock;

use crate::attempt_store::AttemptStore;
use crate::catalog_store::CatalogStore;
use crate::error::MutationError;
use crate::identity::IdentityProvider;
use crate::lock;

//
// ─── OUTCOME TYPES ─────────────────────────────────────────────────────────────
//

/// The write went through but the follow-up refresh did not, so the local
/// snapshot may lag the server until the next successful load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("write applied but the follow-up refresh failed: {reason}")]
pub struct StaleDataWarning {
    reason: String,
}

impl StaleDataWarning {
    fn new(source: &dyn std::fmt::Display) -> Self {
        Self {
            reason: source.to_string(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Result of a successful mutation, carrying the server-confirmed record and
/// an optional staleness warning from the reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    pub record: T,
    pub warning: Option<StaleDataWarning>,
}

impl<T> MutationOutcome<T> {
    fn clean(record: T) -> Self {
        Self {
            record,
            warning: None,
        }
    }

    fn stale(record: T, source: &dyn std::fmt::Display) -> Self {
        Self {
            record,
            warning: Some(StaleDataWarning::new(source)),
        }
    }

    /// Returns true if the local snapshot may lag the server.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.warning.is_some()
    }
}

//
// ─── COORDINATOR ───────────────────────────────────────────────────────────────
//

/// The single authorized entry point for writes.
///
/// Every mutation re-checks the session immediately before issuing gateway
/// traffic, holds a per-key in-flight guard so concurrent writes to the same
/// `(user, problem)` key are rejected rather than interleaved, and re-fetches
/// the affected store before reporting success so derived views only ever see
/// server-confirmed state.
pub struct MutationCoordinator {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    catalog: Arc<CatalogStore>,
    attempts: Arc<AttemptStore>,
    in_flight: Mutex<HashSet<(UserId, ProblemId)>>,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        catalog: Arc<CatalogStore>,
        attempts: Arc<AttemptStore>,
    ) -> Self {
        Self {
            clock,
            identity,
            catalog,
            attempts,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Submit a new catalog problem and reconcile the catalog snapshot.
    ///
    /// Problem creation always allocates a fresh identity, so it carries no
    /// per-key conflict tracking.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::AuthRequired` before any gateway traffic when
    /// no session is active, or the propagated `CatalogError`.
    pub async fn add_problem(
        &self,
        draft: ProblemDraft,
    ) -> Result<MutationOutcome<Problem>, MutationError> {
        self.require_user()?;

        let created = self.catalog.create(draft).await?;
        log::debug!("problem {} added to the catalog", created.id());

        match self.catalog.load_all().await {
            Ok(_) => Ok(MutationOutcome::clean(created)),
            Err(err) => {
                log::warn!("catalog refresh after create failed: {err}");
                Ok(MutationOutcome::stale(created, &err))
            }
        }
    }

    /// Start tracking a problem with the default first-attempt record, dated
    /// today.
    ///
    /// # Errors
    ///
    /// Same contract as [`MutationCoordinator::track_problem`].
    pub async fn start_tracking(
        &self,
        problem_id: ProblemId,
    ) -> Result<MutationOutcome<Attempt>, MutationError> {
        let user_id = self.require_user()?;
        let draft = AttemptDraft::started(user_id, problem_id, self.clock.today());
        self.track_problem(draft).await
    }

    /// Submit a new attempt record and reconcile the attempt snapshot.
    ///
    /// The draft must belong to the signed-in user; the catalog snapshot, if
    /// loaded, is used to verify the problem reference.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::AuthRequired` before any gateway traffic when
    /// no session is active or the draft names another user,
    /// `MutationError::Conflict` while a mutation for the same key is still
    /// submitting, or the propagated `AttemptError`.
    pub async fn track_problem(
        &self,
        draft: AttemptDraft,
    ) -> Result<MutationOutcome<Attempt>, MutationError> {
        let user_id = self.require_user()?;
        if draft.user_id != user_id {
            return Err(MutationError::AuthRequired);
        }

        let problem_id = draft.problem_id;
        let _guard = self.begin(user_id, problem_id)?;

        let catalog = self.catalog.all();
        let snapshot = (!catalog.is_empty()).then_some(catalog.as_slice());
        let created = self.attempts.create(draft, snapshot).await?;

        Ok(self.reconcile_attempts(user_id, created).await)
    }

    /// Patch an existing attempt record and reconcile the attempt snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::AuthRequired`, `MutationError::Conflict`, or
    /// the propagated `AttemptError` (validation, not-found, fetch).
    pub async fn update_progress(
        &self,
        problem_id: ProblemId,
        patch: AttemptPatch,
    ) -> Result<MutationOutcome<Attempt>, MutationError> {
        let user_id = self.require_user()?;
        let _guard = self.begin(user_id, problem_id)?;

        let updated = self.attempts.update(user_id, problem_id, &patch).await?;

        Ok(self.reconcile_attempts(user_id, updated).await)
    }

    /// Delete an attempt record and reconcile the attempt snapshot.
    ///
    /// # Errors
    ///
    /// Returns `MutationError::AuthRequired`, `MutationError::Conflict`, or
    /// the propagated `AttemptError`.
    pub async fn untrack_problem(
        &self,
        problem_id: ProblemId,
    ) -> Result<MutationOutcome<()>, MutationError> {
        let user_id = self.require_user()?;
        let _guard = self.begin(user_id, problem_id)?;

        self.attempts.delete(user_id, problem_id).await?;

        Ok(self.reconcile_attempts(user_id, ()).await)
    }

    fn require_user(&self) -> Result<UserId, MutationError> {
        if !self.identity.is_authenticated() {
            return Err(MutationError::AuthRequired);
        }
        self.identity
            .current_user_id()
            .ok_or(MutationError::AuthRequired)
    }

    fn begin(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> Result<InFlightGuard<'_>, MutationError> {
        let key = (user_id, problem_id);
        if !lock(&self.in_flight).insert(key) {
            return Err(MutationError::Conflict(problem_id));
        }
        Ok(InFlightGuard {
            keys: &self.in_flight,
            key,
        })
    }

    /// Re-fetch the attempt snapshot after a successful write. The write is
    /// still reported successful when the refresh fails, just with a
    /// staleness warning attached.
    async fn reconcile_attempts<T>(&self, user_id: UserId, record: T) -> MutationOutcome<T> {
        match self.attempts.load_for_user(user_id).await {
            Ok(_) => MutationOutcome::clean(record),
            Err(err) => {
                log::warn!("attempt refresh after mutation failed: {err}");
                MutationOutcome::stale(record, &err)
            }
        }
    }
}

/// Marks one `(user, problem)` key as submitting; removal is tied to drop so
/// every exit path releases the key.
struct InFlightGuard<'a> {
    keys: &'a Mutex<HashSet<(UserId, ProblemId)>>,
    key: (UserId, ProblemId),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock(self.keys).remove(&self.key);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
