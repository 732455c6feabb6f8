#![forbid(unsafe_code)]

pub mod attempt_store;
pub mod catalog_store;
pub mod coordinator;
pub mod error;
pub mod identity;

pub use tracker_core::Clock;

pub use attempt_store::AttemptStore;
pub use catalog_store::CatalogStore;
pub use coordinator::{MutationCoordinator, MutationOutcome, StaleDataWarning};
pub use error::{AttemptError, CatalogError, MutationError};
pub use identity::{IdentityProvider, SessionIdentity, StaticIdentity};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a snapshot mutex, recovering the data if a writer panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
