use std::sync::{Arc, Mutex};

use gateway::AttemptGateway;
use tracker_core::model::{Attempt, AttemptDraft, AttemptPatch, Problem, ProblemId, UserId};

use crate::error::AttemptError;
use crate::identity::IdentityProvider;
use crate::lock;

/// Client-side cache of the signed-in user's attempt records.
///
/// At most one record exists per `(user, problem)` key. Failed operations
/// never touch the snapshot, which always reflects the last successfully
/// loaded state.
pub struct AttemptStore {
    gateway: Arc<dyn AttemptGateway>,
    identity: Arc<dyn IdentityProvider>,
    snapshot: Mutex<Vec<Attempt>>,
}

impl AttemptStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn AttemptGateway>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            gateway,
            identity,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    /// Fetch all attempts for `user_id`, replacing prior contents.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AuthRequired` without contacting the gateway
    /// unless `user_id` is the currently authenticated user, and
    /// `AttemptError::Fetch` if the fetch itself fails.
    pub async fn load_for_user(&self, user_id: UserId) -> Result<Vec<Attempt>, AttemptError> {
        if self.identity.current_user_id() != Some(user_id) {
            return Err(AttemptError::AuthRequired);
        }

        let attempts = self.gateway.list_attempts(user_id).await?;
        log::debug!("loaded {} attempts for user {user_id}", attempts.len());
        *lock(&self.snapshot) = attempts.clone();
        Ok(attempts)
    }

    /// Validate a draft and submit it; the server record is appended.
    ///
    /// When a catalog snapshot is supplied the draft's problem must be
    /// present in it. A key already tracked locally is rejected before any
    /// gateway traffic, so one problem never ends up with two records.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Validation`, `AttemptError::Duplicate`, or
    /// `AttemptError::Fetch`.
    pub async fn create(
        &self,
        draft: AttemptDraft,
        catalog: Option<&[Problem]>,
    ) -> Result<Attempt, AttemptError> {
        let validated = draft.validate(catalog)?;

        let already_tracked = lock(&self.snapshot)
            .iter()
            .any(|a| a.key() == (validated.user_id, validated.problem_id));
        if already_tracked {
            return Err(AttemptError::Duplicate(validated.problem_id));
        }

        let created = self.gateway.create_attempt(&validated).await?;
        lock(&self.snapshot).push(created.clone());
        Ok(created)
    }

    /// Validate a patch and apply it remotely, then replace the matching
    /// local record with the server's copy.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Patch` for an empty patch, a key-field change
    /// or an invalid attempt count (leaving the stored record untouched),
    /// `AttemptError::NotFound` when the key is absent locally, and
    /// `AttemptError::Fetch` if the remote patch fails.
    pub async fn update(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
        patch: &AttemptPatch,
    ) -> Result<Attempt, AttemptError> {
        patch.validate(user_id, problem_id)?;

        if self.get(user_id, problem_id).is_none() {
            return Err(AttemptError::NotFound(problem_id));
        }

        let updated = self.gateway.update_attempt(user_id, problem_id, patch).await?;
        let mut snapshot = lock(&self.snapshot);
        if let Some(slot) = snapshot.iter_mut().find(|a| a.key() == (user_id, problem_id)) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Delete the record identified by the key, locally and remotely.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::NotFound` when the key is absent locally and
    /// `AttemptError::Fetch` if the remote delete fails; local removal only
    /// happens after gateway confirmation.
    pub async fn delete(&self, user_id: UserId, problem_id: ProblemId) -> Result<(), AttemptError> {
        if self.get(user_id, problem_id).is_none() {
            return Err(AttemptError::NotFound(problem_id));
        }

        self.gateway.delete_attempt(user_id, problem_id).await?;
        lock(&self.snapshot).retain(|a| a.key() != (user_id, problem_id));
        Ok(())
    }

    /// Current snapshot, in server response order.
    #[must_use]
    pub fn all(&self) -> Vec<Attempt> {
        lock(&self.snapshot).clone()
    }

    /// Look one record up by key.
    #[must_use]
    pub fn get(&self, user_id: UserId, problem_id: ProblemId) -> Option<Attempt> {
        lock(&self.snapshot)
            .iter()
            .find(|a| a.key() == (user_id, problem_id))
            .cloned()
    }

    /// Returns true if the key is already tracked locally.
    #[must_use]
    pub fn contains(&self, user_id: UserId, problem_id: ProblemId) -> bool {
        self.get(user_id, problem_id).is_some()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
