//! Identity collaborator surface.
//!
//! The real session lives in an external authentication provider; the stores
//! and coordinator only ever ask these two questions, re-checked per call
//! because session state can change between renders.

use std::sync::{Arc, Mutex};

use tracker_core::model::UserId;

use crate::lock;

/// Read-only view of the current session.
pub trait IdentityProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn current_user_id(&self) -> Option<UserId>;
}

/// Fixed identity for tests and embedders without a live session provider.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    user_id: Option<UserId>,
}

impl StaticIdentity {
    #[must_use]
    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.user_id
    }
}

/// Mutable session holder whose state can flip between calls, mirroring a
/// cookie-backed login/logout flow.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    user_id: Arc<Mutex<Option<UserId>>>,
}

impl SessionIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user_id: UserId) {
        *lock(&self.user_id) = Some(user_id);
    }

    pub fn sign_out(&self) {
        *lock(&self.user_id) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn is_authenticated(&self) -> bool {
        lock(&self.user_id).is_some()
    }

    fn current_user_id(&self) -> Option<UserId> {
        *lock(&self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_identity_reports_session() {
        let signed_in = StaticIdentity::signed_in(UserId::new(1));
        assert!(signed_in.is_authenticated());
        assert_eq!(signed_in.current_user_id(), Some(UserId::new(1)));

        let signed_out = StaticIdentity::signed_out();
        assert!(!signed_out.is_authenticated());
        assert_eq!(signed_out.current_user_id(), None);
    }

    #[test]
    fn session_identity_flips_between_calls() {
        let session = SessionIdentity::new();
        assert!(!session.is_authenticated());

        session.sign_in(UserId::new(7));
        assert!(session.is_authenticated());
        assert_eq!(session.current_user_id(), Some(UserId::new(7)));

        session.sign_out();
        assert!(!session.is_authenticated());
    }
}
