//! Shared error types for the services crate.

use thiserror::Error;

use gateway::GatewayError;
use tracker_core::model::{
    AttemptPatchError, AttemptValidationError, ProblemId, ProblemValidationError,
};

/// Errors emitted by `CatalogStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ProblemValidationError),

    #[error(transparent)]
    Fetch(#[from] GatewayError),
}

/// Errors emitted by `AttemptStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AttemptError {
    #[error(transparent)]
    Validation(#[from] AttemptValidationError),

    #[error(transparent)]
    Patch(#[from] AttemptPatchError),

    #[error("problem {0} is already tracked")]
    Duplicate(ProblemId),

    #[error("no attempt recorded for problem {0}")]
    NotFound(ProblemId),

    #[error("authentication required")]
    AuthRequired,

    #[error(transparent)]
    Fetch(#[from] GatewayError),
}

/// Errors emitted by `MutationCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MutationError {
    #[error("authentication required")]
    AuthRequired,

    #[error("a mutation for problem {0} is already in flight")]
    Conflict(ProblemId),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Attempt(#[from] AttemptError),
}
