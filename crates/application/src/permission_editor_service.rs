use std::sync::Arc;

use gatehouse_core::{AppError, AppResult, RoleId, UserIdentity};
use gatehouse_domain::{
    AuditAction, ModulePermissionGroup, Permission, PermissionBatch, RolePermissions,
    SelectionState, ViewScope,
};
use tracing::info;

use crate::{
    AccessControlService, AuditEvent, AuditRepository, ModuleCatalog, ROLE_EDIT_PERMISSION,
    RolePermissionRepository,
};

mod matrix;
mod mutations;

/// Grant state of one listed permission for a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrantState {
    /// Permission descriptor.
    pub permission: Permission,
    /// Whether the role currently holds it.
    pub granted: bool,
}

/// Editor projection of one module for a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePermissionState {
    /// Module identifier.
    pub module_id: String,
    /// Module display name.
    pub module_name: String,
    /// Three-state value of the module's "select all" control.
    pub selection: SelectionState,
    /// Effective view scope, present only for modules with record ownership.
    pub view_scope: Option<ViewScope>,
    /// Listed permissions in display order.
    pub permissions: Vec<PermissionGrantState>,
}

/// Editor projection of every catalogued module for a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionMatrix {
    /// Role being edited.
    pub role_id: RoleId,
    /// Per-module state in catalog order.
    pub modules: Vec<ModulePermissionState>,
}

/// Application service behind the admin permission editor.
///
/// Every mutation collects the writes emitted by the permission matrix into
/// one batch and hands it to the repository in a single call.
#[derive(Clone)]
pub struct PermissionEditorService {
    access_control_service: AccessControlService,
    repository: Arc<dyn RolePermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    catalog: Arc<ModuleCatalog>,
}

impl PermissionEditorService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        access_control_service: AccessControlService,
        repository: Arc<dyn RolePermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        catalog: Arc<ModuleCatalog>,
    ) -> Self {
        Self {
            access_control_service,
            repository,
            audit_repository,
            catalog,
        }
    }

    async fn require_editor(&self, actor: &UserIdentity) -> AppResult<()> {
        self.access_control_service
            .require_permission(actor, ROLE_EDIT_PERMISSION)
            .await
    }

    fn require_group(&self, module_id: &str) -> AppResult<&ModulePermissionGroup> {
        self.catalog.find_group(module_id).ok_or_else(|| {
            AppError::NotFound(format!("module '{module_id}' is not in the catalog"))
        })
    }

    fn require_permission_descriptor(&self, permission_key: &str) -> AppResult<&Permission> {
        self.catalog.find_permission(permission_key).ok_or_else(|| {
            AppError::NotFound(format!(
                "permission '{permission_key}' is not in the catalog"
            ))
        })
    }

    async fn commit(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        change: &str,
        batch: PermissionBatch,
    ) -> AppResult<RolePermissions> {
        if batch.is_empty() {
            return self.repository.find_role_permissions(role_id).await;
        }

        let changed_keys = batch
            .writes()
            .iter()
            .map(|write| format!("{}={}", write.key, write.value))
            .collect::<Vec<_>>()
            .join(", ");
        let write_count = batch.writes().len();

        let updated = self
            .repository
            .apply_permission_writes(role_id, batch.into_writes())
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::RolePermissionsUpdated,
                resource_type: "role_permissions".to_owned(),
                resource_id: role_id.as_str().to_owned(),
                detail: Some(format!("{change}: {changed_keys}")),
            })
            .await?;

        info!(
            subject = actor.subject(),
            role_id = %role_id,
            write_count,
            change,
            "role permissions updated"
        );

        Ok(updated)
    }
}
