use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by access-control use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when an editor batch is persisted for a role.
    RolePermissionsUpdated,
    /// Emitted when billing replaces an actor's entitlement snapshot.
    EntitlementReplaced,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RolePermissionsUpdated => "role.permissions.updated",
            Self::EntitlementReplaced => "entitlement.replaced",
        }
    }
}
