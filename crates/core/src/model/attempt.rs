use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{ProblemId, UserId};
use crate::model::problem::Problem;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Progress status of one user's attempt at one problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttemptStatus {
    Attempted,
    Completed,
    Skipped,
}

impl AttemptStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Attempted => "Attempted",
            AttemptStatus::Completed => "Completed",
            AttemptStatus::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown attempt status: {0:?}")]
pub struct ParseStatusError(String);

impl FromStr for AttemptStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Attempted" => Ok(AttemptStatus::Attempted),
            "Completed" => Ok(AttemptStatus::Completed),
            "Skipped" => Ok(AttemptStatus::Skipped),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

//
// ─── ATTEMPT TYPES ─────────────────────────────────────────────────────────────
//

/// One user's tracked progress against one catalog problem.
///
/// Keyed by `(user_id, problem_id)`; at most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub status: AttemptStatus,
    pub num_attempts: u32,
    pub notes: String,
    pub date_attempted: NaiveDate,
}

impl Attempt {
    /// Composite key identifying this record.
    #[must_use]
    pub fn key(&self) -> (UserId, ProblemId) {
        (self.user_id, self.problem_id)
    }
}

/// Fields for a new attempt record, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptDraft {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub status: AttemptStatus,
    pub num_attempts: u32,
    pub notes: String,
    pub date_attempted: NaiveDate,
}

impl AttemptDraft {
    /// Default draft for a user who starts tracking a problem today.
    #[must_use]
    pub fn started(user_id: UserId, problem_id: ProblemId, today: NaiveDate) -> Self {
        Self {
            user_id,
            problem_id,
            status: AttemptStatus::Attempted,
            num_attempts: 1,
            notes: String::new(),
            date_attempted: today,
        }
    }

    /// Validate the draft against the attempt invariants.
    ///
    /// When a catalog snapshot is supplied, `problem_id` must reference a
    /// problem present in it.
    ///
    /// # Errors
    ///
    /// Returns `AttemptValidationError` on an invalid attempt count or an
    /// unknown problem reference.
    pub fn validate(
        self,
        catalog: Option<&[Problem]>,
    ) -> Result<ValidatedAttempt, AttemptValidationError> {
        if self.num_attempts < 1 {
            return Err(AttemptValidationError::InvalidAttemptCount);
        }

        if let Some(problems) = catalog {
            if !problems.iter().any(|p| p.id() == self.problem_id) {
                return Err(AttemptValidationError::UnknownProblem(self.problem_id));
            }
        }

        Ok(ValidatedAttempt {
            user_id: self.user_id,
            problem_id: self.problem_id,
            status: self.status,
            num_attempts: self.num_attempts,
            notes: self.notes,
            date_attempted: self.date_attempted,
        })
    }
}

/// An attempt draft that passed validation and is ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAttempt {
    pub user_id: UserId,
    pub problem_id: ProblemId,
    pub status: AttemptStatus,
    pub num_attempts: u32,
    pub notes: String,
    pub date_attempted: NaiveDate,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptValidationError {
    #[error("attempt count must be at least 1")]
    InvalidAttemptCount,

    #[error("problem {0} is not in the catalog")]
    UnknownProblem(ProblemId),
}

//
// ─── PATCH ─────────────────────────────────────────────────────────────────────
//

/// Partial update for an existing attempt record.
///
/// Status, attempt count and notes are the only mutable fields. The key slots
/// exist so a caller-supplied attempt to rewrite them is detected and rejected
/// instead of silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptPatch {
    pub status: Option<AttemptStatus>,
    pub num_attempts: Option<u32>,
    pub notes: Option<String>,
    pub user_id: Option<UserId>,
    pub problem_id: Option<ProblemId>,
}

impl AttemptPatch {
    /// Returns true if no mutable field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.num_attempts.is_none() && self.notes.is_none()
    }

    /// Validate the patch against the record identified by the given key.
    ///
    /// # Errors
    ///
    /// Returns `AttemptPatchError` when the patch tries to change a key field,
    /// carries no mutable field, or violates the attempt-count invariant.
    pub fn validate(
        &self,
        user_id: UserId,
        problem_id: ProblemId,
    ) -> Result<(), AttemptPatchError> {
        if self.user_id.is_some_and(|id| id != user_id)
            || self.problem_id.is_some_and(|id| id != problem_id)
        {
            return Err(AttemptPatchError::ImmutableField);
        }

        if let Some(count) = self.num_attempts {
            if count < 1 {
                return Err(AttemptPatchError::InvalidAttemptCount);
            }
        }

        if self.is_empty() {
            return Err(AttemptPatchError::Empty);
        }

        Ok(())
    }

    /// Apply the patch to a record, yielding the updated copy.
    ///
    /// Callers are expected to have validated the patch first; key fields are
    /// never touched.
    #[must_use]
    pub fn apply_to(&self, attempt: &Attempt) -> Attempt {
        Attempt {
            user_id: attempt.user_id,
            problem_id: attempt.problem_id,
            status: self.status.unwrap_or(attempt.status),
            num_attempts: self.num_attempts.unwrap_or(attempt.num_attempts),
            notes: self.notes.clone().unwrap_or_else(|| attempt.notes.clone()),
            date_attempted: attempt.date_attempted,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptPatchError {
    #[error("patch contains no updatable fields")]
    Empty,

    #[error("user id and problem id cannot be changed")]
    ImmutableField,

    #[error("attempt count must be at least 1")]
    InvalidAttemptCount,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
