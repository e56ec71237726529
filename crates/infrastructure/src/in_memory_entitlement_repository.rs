use std::collections::HashMap;

use async_trait::async_trait;
use gatehouse_application::EntitlementRepository;
use gatehouse_core::AppResult;
use gatehouse_domain::Entitlement;
use tokio::sync::RwLock;

/// In-memory store of entitlement snapshots keyed by subject.
#[derive(Debug, Default)]
pub struct InMemoryEntitlementRepository {
    entitlements: RwLock<HashMap<String, Entitlement>>,
}

impl InMemoryEntitlementRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entitlements: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EntitlementRepository for InMemoryEntitlementRepository {
    async fn find_entitlement(&self, subject: &str) -> AppResult<Option<Entitlement>> {
        Ok(self.entitlements.read().await.get(subject).cloned())
    }

    async fn save_entitlement(&self, subject: &str, entitlement: Entitlement) -> AppResult<()> {
        self.entitlements
            .write()
            .await
            .insert(subject.to_owned(), entitlement);
        Ok(())
    }
}
