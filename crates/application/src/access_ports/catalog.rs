use std::collections::BTreeSet;

use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{ModulePermissionGroup, Permission, PermissionKey};

/// Permission an actor needs to edit role permissions.
pub const ROLE_EDIT_PERMISSION: &str = "roles.edit";

/// Protected modules known to the back-office, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCatalog {
    groups: Vec<ModulePermissionGroup>,
}

impl ModuleCatalog {
    /// Creates a catalog, rejecting duplicate module identifiers.
    pub fn new(groups: Vec<ModulePermissionGroup>) -> AppResult<Self> {
        let mut seen = BTreeSet::new();
        for group in &groups {
            if !seen.insert(group.module_id().to_owned()) {
                return Err(AppError::Validation(format!(
                    "module '{}' is declared more than once",
                    group.module_id()
                )));
            }
        }

        Ok(Self { groups })
    }

    /// Built-in catalog used when no catalog file is configured.
    pub fn builtin() -> AppResult<Self> {
        Self::new(vec![
            ModulePermissionGroup::standard("products", "Products", true)?,
            ModulePermissionGroup::standard("leads", "Leads", true)?,
            ModulePermissionGroup::new(
                "roles",
                "Roles",
                vec![
                    Permission::new(
                        PermissionKey::new("roles", "view")?,
                        "View roles",
                        None,
                        false,
                    )?,
                    Permission::new(
                        PermissionKey::new("roles", "edit")?,
                        "Edit role permissions",
                        Some("Grants access to the permission editor".to_owned()),
                        false,
                    )?,
                ],
            )?,
        ])
    }

    /// Returns every module group in display order.
    #[must_use]
    pub fn groups(&self) -> &[ModulePermissionGroup] {
        self.groups.as_slice()
    }

    /// Finds a module group by identifier.
    #[must_use]
    pub fn find_group(&self, module_id: &str) -> Option<&ModulePermissionGroup> {
        self.groups
            .iter()
            .find(|group| group.module_id() == module_id)
    }

    /// Finds a listed permission by its full key.
    #[must_use]
    pub fn find_permission(&self, permission_key: &str) -> Option<&Permission> {
        let (module_id, _) = permission_key.split_once('.')?;
        self.find_group(module_id)?.find_permission(permission_key)
    }
}
