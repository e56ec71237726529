use async_trait::async_trait;
use gatehouse_core::{AppResult, RoleId};
use gatehouse_domain::{Entitlement, PermissionWrite, RolePermissions};

/// Key-value store of role permission snapshots.
#[async_trait]
pub trait RolePermissionRepository: Send + Sync {
    /// Returns the stored snapshot for a role.
    ///
    /// Unknown roles resolve to an empty snapshot, which denies everything.
    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<RolePermissions>;

    /// Persists a whole batch of writes atomically and returns the result.
    ///
    /// Readers must never observe a state where only part of the batch is
    /// applied.
    async fn apply_permission_writes(
        &self,
        role_id: &RoleId,
        writes: Vec<PermissionWrite>,
    ) -> AppResult<RolePermissions>;
}

/// Store of entitlement snapshots keyed by subject.
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Finds the current entitlement snapshot for a subject.
    async fn find_entitlement(&self, subject: &str) -> AppResult<Option<Entitlement>>;

    /// Replaces the snapshot for a subject.
    async fn save_entitlement(&self, subject: &str, entitlement: Entitlement) -> AppResult<()>;
}
