use gatehouse_domain::{is_allowed, selection_state, view_scope};

use super::*;

impl PermissionEditorService {
    /// Returns the editor projection of a role.
    pub async fn role_matrix(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
    ) -> AppResult<RolePermissionMatrix> {
        self.require_editor(actor).await?;

        let role_permissions = self.repository.find_role_permissions(role_id).await?;
        Ok(self.project(role_id, &role_permissions))
    }

    pub(super) fn project(
        &self,
        role_id: &RoleId,
        role_permissions: &RolePermissions,
    ) -> RolePermissionMatrix {
        let modules = self
            .catalog
            .groups()
            .iter()
            .map(|group| ModulePermissionState {
                module_id: group.module_id().to_owned(),
                module_name: group.module_name().to_owned(),
                selection: selection_state(group, role_permissions),
                view_scope: group
                    .supports_scope()
                    .then(|| view_scope(role_permissions, group.module_id())),
                permissions: group
                    .permissions()
                    .iter()
                    .map(|permission| PermissionGrantState {
                        permission: permission.clone(),
                        granted: is_allowed(role_permissions, &permission.key().to_string()),
                    })
                    .collect(),
            })
            .collect();

        RolePermissionMatrix {
            role_id: role_id.clone(),
            modules,
        }
    }
}
