use std::sync::{Arc, Mutex};

use gateway::CatalogGateway;
use tracker_core::model::{Problem, ProblemDraft, ProblemId};

use crate::error::CatalogError;
use crate::lock;

/// Client-side cache of the shared problem catalog.
///
/// Holds the last successfully loaded snapshot; failed operations never touch
/// it, so readers always observe server-confirmed state.
pub struct CatalogStore {
    gateway: Arc<dyn CatalogGateway>,
    snapshot: Mutex<Vec<Problem>>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self {
            gateway,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    /// Fetch the full catalog, replacing prior contents wholesale, and return
    /// the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Fetch` if the gateway call fails or any record
    /// is malformed; the prior snapshot is retained in that case.
    pub async fn load_all(&self) -> Result<Vec<Problem>, CatalogError> {
        let problems = self.gateway.list_problems().await?;
        log::debug!("catalog reloaded with {} problems", problems.len());
        *lock(&self.snapshot) = problems.clone();
        Ok(problems)
    }

    /// Validate a draft and submit it; the server-returned record is appended
    /// to the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` (listing every failing field)
    /// without any gateway traffic, or `CatalogError::Fetch` if the
    /// submission fails.
    pub async fn create(&self, draft: ProblemDraft) -> Result<Problem, CatalogError> {
        let validated = draft.validate()?;
        let created = self.gateway.create_problem(&validated).await?;
        lock(&self.snapshot).push(created.clone());
        Ok(created)
    }

    /// Current snapshot, in server response order.
    #[must_use]
    pub fn all(&self) -> Vec<Problem> {
        lock(&self.snapshot).clone()
    }

    /// Look one problem up in the snapshot.
    #[must_use]
    pub fn get(&self, id: ProblemId) -> Option<Problem> {
        lock(&self.snapshot).iter().find(|p| p.id() == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.snapshot).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.snapshot).is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::{GatewayError, InMemoryGateway};
    use tracker_core::model::Difficulty;

    fn draft(name: &str, category: &str) -> ProblemDraft {
        ProblemDraft {
            name: name.to_string(),
            link: "https://leetcode.com/problems/two-sum".to_string(),
            difficulty: Difficulty::Easy,
            category: category.to_string(),
        }
    }

    fn seeded_gateway() -> Arc<InMemoryGateway> {
        let gateway = Arc::new(InMemoryGateway::new());
        let seeded = draft("Two Sum", "Arrays")
            .validate()
            .unwrap()
            .assign_id(ProblemId::new(1));
        gateway.seed_problems(vec![seeded]);
        gateway
    }

    #[tokio::test]
    async fn load_all_replaces_contents_wholesale() {
        let gateway = seeded_gateway();
        let store = CatalogStore::new(gateway.clone());

        assert!(store.is_empty());
        let snapshot = store.load_all().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all(), snapshot);
    }

    #[tokio::test]
    async fn load_all_is_idempotent_against_unchanged_remote() {
        let store = CatalogStore::new(seeded_gateway());

        let first = store.load_all().await.unwrap();
        let second = store.load_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_snapshot() {
        let gateway = seeded_gateway();
        let store = CatalogStore::new(gateway.clone());
        store.load_all().await.unwrap();

        gateway.fail_next_call(GatewayError::Timeout);
        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(GatewayError::Timeout)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_validates_before_any_gateway_traffic() {
        let gateway = Arc::new(InMemoryGateway::new());
        let store = CatalogStore::new(gateway.clone());

        let err = store.create(draft("ab", "")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(gateway.calls(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_appends_the_server_record() {
        let gateway = Arc::new(InMemoryGateway::new());
        let store = CatalogStore::new(gateway.clone());

        let created = store.create(draft("Two Sum", "Arrays")).await.unwrap();
        assert_eq!(created.id(), ProblemId::new(1));
        assert_eq!(store.get(created.id()), Some(created));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_create_leaves_state_unchanged() {
        let gateway = Arc::new(InMemoryGateway::new());
        let store = CatalogStore::new(gateway.clone());

        gateway.fail_next_call(GatewayError::Transport("connection refused".into()));
        let err = store.create(draft("Two Sum", "Arrays")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Fetch(_)));
        assert!(store.is_empty());
    }
}
