use gatehouse_domain::{
    click_select_all, select_all_for_module, set_view_scope, toggle_base_permission,
};

use super::*;

impl PermissionEditorService {
    /// Moves a module with record ownership to the requested view scope.
    pub async fn set_view_scope(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        module_id: &str,
        scope: ViewScope,
    ) -> AppResult<RolePermissionMatrix> {
        self.require_editor(actor).await?;
        let group = self.require_group(module_id)?;
        if !group.supports_scope() {
            return Err(AppError::Validation(format!(
                "module '{module_id}' has no record ownership and does not support view scope"
            )));
        }

        let current = self.repository.find_role_permissions(role_id).await?;
        let mut batch = PermissionBatch::new();
        set_view_scope(&current, module_id, scope, |key, value| {
            batch.push(key, value)
        });

        let updated = self
            .commit(
                actor,
                role_id,
                &format!("set '{module_id}' view scope to '{}'", scope.as_str()),
                batch,
            )
            .await?;
        Ok(self.project(role_id, &updated))
    }

    /// Flips one catalogued permission, cascading scope for a scoped `view`.
    ///
    /// The flip is computed from a snapshot read before the batch is written,
    /// so concurrent edits of the same role are last-writer-wins. Each batch
    /// rewrites every scope key it touches, so the stored scope stays valid.
    pub async fn toggle_permission(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        permission_key: &str,
    ) -> AppResult<RolePermissionMatrix> {
        self.require_editor(actor).await?;
        let permission = self.require_permission_descriptor(permission_key)?;

        let current = self.repository.find_role_permissions(role_id).await?;
        let mut batch = PermissionBatch::new();
        toggle_base_permission(&current, permission, |key, value| batch.push(key, value));

        let updated = self
            .commit(
                actor,
                role_id,
                &format!("toggled '{permission_key}'"),
                batch,
            )
            .await?;
        Ok(self.project(role_id, &updated))
    }

    /// Sets every permission of a module to `checked`.
    pub async fn select_all(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        module_id: &str,
        checked: bool,
    ) -> AppResult<RolePermissionMatrix> {
        self.require_editor(actor).await?;
        let group = self.require_group(module_id)?;

        let mut batch = PermissionBatch::new();
        select_all_for_module(group, checked, |key, value| batch.push(key, value));

        let change = if checked {
            format!("selected all of '{module_id}'")
        } else {
            format!("cleared all of '{module_id}'")
        };
        let updated = self.commit(actor, role_id, &change, batch).await?;
        Ok(self.project(role_id, &updated))
    }

    /// Applies one click on a module's three-state "select all" control.
    ///
    /// Like [`Self::toggle_permission`], the click is resolved against the
    /// snapshot read first, so concurrent edits are last-writer-wins.
    pub async fn click_select_all(
        &self,
        actor: &UserIdentity,
        role_id: &RoleId,
        module_id: &str,
    ) -> AppResult<RolePermissionMatrix> {
        self.require_editor(actor).await?;
        let group = self.require_group(module_id)?;

        let current = self.repository.find_role_permissions(role_id).await?;
        let mut batch = PermissionBatch::new();
        click_select_all(group, &current, |key, value| batch.push(key, value));

        let updated = self
            .commit(
                actor,
                role_id,
                &format!("clicked select-all of '{module_id}'"),
                batch,
            )
            .await?;
        Ok(self.project(role_id, &updated))
    }
}
