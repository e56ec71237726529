use std::collections::HashMap;

use async_trait::async_trait;
use gatehouse_application::RolePermissionRepository;
use gatehouse_core::{AppResult, RoleId};
use gatehouse_domain::{PermissionWrite, RolePermissions};
use tokio::sync::RwLock;

/// In-memory store of role permission snapshots.
///
/// A batch is applied while holding the write lock, so readers observe either
/// none or all of it.
#[derive(Debug, Default)]
pub struct InMemoryRolePermissionRepository {
    snapshots: RwLock<HashMap<RoleId, RolePermissions>>,
}

impl InMemoryRolePermissionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a repository pre-populated with role snapshots.
    #[must_use]
    pub fn with_roles(roles: impl IntoIterator<Item = (RoleId, RolePermissions)>) -> Self {
        Self {
            snapshots: RwLock::new(roles.into_iter().collect()),
        }
    }
}

#[async_trait]
impl RolePermissionRepository for InMemoryRolePermissionRepository {
    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<RolePermissions> {
        Ok(self
            .snapshots
            .read()
            .await
            .get(role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn apply_permission_writes(
        &self,
        role_id: &RoleId,
        writes: Vec<PermissionWrite>,
    ) -> AppResult<RolePermissions> {
        let mut snapshots = self.snapshots.write().await;
        let mut staged = snapshots.get(role_id).cloned().unwrap_or_default();
        for write in writes {
            staged.set(write.key, write.value);
        }

        snapshots.insert(role_id.clone(), staged.clone());
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_application::RolePermissionRepository;
    use gatehouse_core::RoleId;
    use gatehouse_domain::{PermissionWrite, RolePermissions};

    use super::InMemoryRolePermissionRepository;

    fn role(value: &str) -> RoleId {
        RoleId::new(value).unwrap_or_else(|error| panic!("role id: {error}"))
    }

    #[tokio::test]
    async fn writes_are_scoped_to_one_role() {
        let repository = InMemoryRolePermissionRepository::with_roles([(
            role("support"),
            RolePermissions::from_iter([("leads.view", true)]),
        )]);

        let updated = repository
            .apply_permission_writes(
                &role("sales"),
                vec![PermissionWrite {
                    key: "leads.edit".to_owned(),
                    value: true,
                }],
            )
            .await;
        assert!(updated.is_ok_and(|snapshot| snapshot.get("leads.edit")
            && !snapshot.get("leads.view")));

        let support = repository.find_role_permissions(&role("support")).await;
        assert!(support.is_ok_and(|snapshot| snapshot.len() == 1 && snapshot.get("leads.view")));
    }

    #[tokio::test]
    async fn later_write_for_same_key_wins_within_batch() {
        let repository = InMemoryRolePermissionRepository::new();

        let updated = repository
            .apply_permission_writes(
                &role("sales"),
                vec![
                    PermissionWrite {
                        key: "leads.view".to_owned(),
                        value: true,
                    },
                    PermissionWrite {
                        key: "leads.view".to_owned(),
                        value: false,
                    },
                ],
            )
            .await;

        assert!(updated.is_ok_and(|snapshot| !snapshot.get("leads.view")));
    }
}
