use std::sync::Arc;

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{RolePermissions, ViewScope, is_allowed, scope_violations, view_scope};
use tracing::{debug, warn};

use crate::RolePermissionRepository;

/// Application service answering role-permission questions for one actor.
#[derive(Clone)]
pub struct AccessControlService {
    repository: Arc<dyn RolePermissionRepository>,
}

impl AccessControlService {
    /// Creates a new access control service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RolePermissionRepository>) -> Self {
        Self { repository }
    }

    /// Loads the current permission snapshot of the actor's role.
    pub async fn role_permissions(&self, actor: &UserIdentity) -> AppResult<RolePermissions> {
        self.repository.find_role_permissions(actor.role_id()).await
    }

    /// Returns whether the actor's role grants the permission.
    pub async fn is_allowed(&self, actor: &UserIdentity, permission_key: &str) -> AppResult<bool> {
        let role_permissions = self.role_permissions(actor).await?;
        let allowed = is_allowed(&role_permissions, permission_key);
        debug!(
            subject = actor.subject(),
            role_id = %actor.role_id(),
            permission_key,
            allowed,
            "evaluated permission"
        );

        Ok(allowed)
    }

    /// Ensures the actor's role grants the permission.
    pub async fn require_permission(
        &self,
        actor: &UserIdentity,
        permission_key: &str,
    ) -> AppResult<()> {
        if self.is_allowed(actor, permission_key).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{permission_key}' through role '{}'",
            actor.subject(),
            actor.role_id()
        )))
    }

    /// Returns the actor's effective view scope for a module.
    pub async fn view_scope(&self, actor: &UserIdentity, module_id: &str) -> AppResult<ViewScope> {
        let role_permissions = self.role_permissions(actor).await?;

        for violation in scope_violations(&role_permissions, module_id) {
            warn!(
                role_id = %actor.role_id(),
                module_id,
                "stored role permissions break scope invariants: {}",
                violation.describe()
            );
        }

        Ok(view_scope(&role_permissions, module_id))
    }

    /// Returns the actor's view scope, failing when the module is not visible.
    pub async fn require_view_scope(
        &self,
        actor: &UserIdentity,
        module_id: &str,
    ) -> AppResult<ViewScope> {
        match self.view_scope(actor, module_id).await? {
            ViewScope::None => Err(AppError::Forbidden(format!(
                "subject '{}' cannot view module '{module_id}' through role '{}'",
                actor.subject(),
                actor.role_id()
            ))),
            scope => Ok(scope),
        }
    }

    /// Returns whether the actor may see one record of a module.
    ///
    /// `assigned_to` is the subject the record is assigned to, if any.
    pub async fn can_view_record(
        &self,
        actor: &UserIdentity,
        module_id: &str,
        assigned_to: Option<&str>,
    ) -> AppResult<bool> {
        Ok(match self.view_scope(actor, module_id).await? {
            ViewScope::All => true,
            ViewScope::Assigned => assigned_to == Some(actor.subject()),
            ViewScope::None => false,
        })
    }
}

#[cfg(test)]
mod tests;
