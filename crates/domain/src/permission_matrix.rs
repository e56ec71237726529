//! Role permission decisions and the cascade rules that keep view scope
//! consistent while an administrator edits a role.
//!
//! Every function here is pure. Mutations never touch the snapshot they are
//! given: they emit `(key, value)` writes through an `apply` callback and the
//! caller persists the whole emitted batch atomically.

use serde::{Deserialize, Serialize};

use crate::permission::{
    ModulePermissionGroup, Permission, PermissionKey, RolePermissions, VIEW_ACTION,
    VIEW_ALL_ACTION, VIEW_ASSIGNED_ACTION, ViewScope,
};

/// Three-state rendering of a module's "select all" control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    /// No listed permission is granted.
    Unchecked,
    /// Some but not all listed permissions are granted.
    Indeterminate,
    /// Every listed permission is granted.
    Checked,
}

impl SelectionState {
    /// Returns a stable transport value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Indeterminate => "indeterminate",
            Self::Checked => "checked",
        }
    }
}

/// Integrity problem found in a stored snapshot for a scoped module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeViolation {
    /// `view_all` and `view_assigned` are both granted.
    ConflictingScopes {
        /// Affected module.
        module_id: String,
    },
    /// A scope key is granted while the base `view` key is not.
    ScopeWithoutView {
        /// The granted scope key.
        scope_key: String,
    },
}

impl ScopeViolation {
    /// Returns a human-readable description for logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ConflictingScopes { module_id } => format!(
                "'{module_id}.{VIEW_ALL_ACTION}' and '{module_id}.{VIEW_ASSIGNED_ACTION}' are both granted"
            ),
            Self::ScopeWithoutView { scope_key } => {
                format!("'{scope_key}' is granted without the base '{VIEW_ACTION}' permission")
            }
        }
    }
}

/// Returns whether the role holds the permission. Unknown keys are denied.
#[must_use]
pub fn is_allowed(role_permissions: &RolePermissions, permission_key: &str) -> bool {
    role_permissions.get(permission_key)
}

/// Derives the effective view scope of a role for a module.
///
/// `view_all` is checked before `view_assigned`, so a corrupted snapshot
/// granting both resolves to [`ViewScope::All`]. A bare `view` grant with no
/// scope key also resolves to [`ViewScope::All`].
#[must_use]
pub fn view_scope(role_permissions: &RolePermissions, module_id: &str) -> ViewScope {
    let keys = ScopeKeys::for_module(module_id);

    if role_permissions.get(&keys.view_all) {
        ViewScope::All
    } else if role_permissions.get(&keys.view_assigned) {
        ViewScope::Assigned
    } else if role_permissions.get(&keys.view) {
        ViewScope::All
    } else {
        ViewScope::None
    }
}

/// Emits the three writes that move a module to the requested scope.
pub fn set_view_scope(
    _role_permissions: &RolePermissions,
    module_id: &str,
    scope: ViewScope,
    mut apply: impl FnMut(&str, bool),
) {
    emit_scope(&ScopeKeys::for_module(module_id), scope, &mut apply);
}

/// Flips one permission, cascading scope when it is a scoped base `view`.
///
/// Turning a scoped `view` off clears both scope keys; turning it on sets the
/// scope to [`ViewScope::All`].
pub fn toggle_base_permission(
    role_permissions: &RolePermissions,
    permission: &Permission,
    mut apply: impl FnMut(&str, bool),
) {
    let key = permission.key();
    let key_string = key.to_string();
    let next_value = !role_permissions.get(&key_string);

    if permission.supports_scope() {
        let keys = ScopeKeys::for_module(key.module_id());
        let scope = if next_value {
            ViewScope::All
        } else {
            ViewScope::None
        };
        emit_scope(&keys, scope, &mut apply);
        return;
    }

    apply(&key_string, next_value);
}

/// Sets every listed permission of the group to `checked`.
///
/// A scoped base `view` cascades: selecting implies [`ViewScope::All`],
/// deselecting clears both scope keys.
pub fn select_all_for_module(
    group: &ModulePermissionGroup,
    checked: bool,
    mut apply: impl FnMut(&str, bool),
) {
    for permission in group.permissions() {
        if permission.supports_scope() {
            let keys = ScopeKeys::for_module(permission.key().module_id());
            let scope = if checked {
                ViewScope::All
            } else {
                ViewScope::None
            };
            emit_scope(&keys, scope, &mut apply);
        } else {
            apply(&permission.key().to_string(), checked);
        }
    }
}

/// Returns whether every listed permission of a non-empty group is granted.
#[must_use]
pub fn is_group_fully_selected(
    group: &ModulePermissionGroup,
    role_permissions: &RolePermissions,
) -> bool {
    !group.permissions().is_empty()
        && group
            .permissions()
            .iter()
            .all(|permission| is_granted(role_permissions, permission.key()))
}

/// Returns whether some, but not all, listed permissions are granted.
#[must_use]
pub fn is_group_partially_selected(
    group: &ModulePermissionGroup,
    role_permissions: &RolePermissions,
) -> bool {
    let granted = group
        .permissions()
        .iter()
        .filter(|permission| is_granted(role_permissions, permission.key()))
        .count();

    granted > 0 && granted < group.permissions().len()
}

/// Returns the three-state value of the group's "select all" control.
#[must_use]
pub fn selection_state(
    group: &ModulePermissionGroup,
    role_permissions: &RolePermissions,
) -> SelectionState {
    if is_group_fully_selected(group, role_permissions) {
        SelectionState::Checked
    } else if is_group_partially_selected(group, role_permissions) {
        SelectionState::Indeterminate
    } else {
        SelectionState::Unchecked
    }
}

/// Emits the writes of one click on the group's "select all" control.
///
/// Only a fully checked control deselects; an indeterminate one always
/// selects everything.
pub fn click_select_all(
    group: &ModulePermissionGroup,
    role_permissions: &RolePermissions,
    apply: impl FnMut(&str, bool),
) {
    let checked = selection_state(group, role_permissions) != SelectionState::Checked;
    select_all_for_module(group, checked, apply);
}

/// Lists invariant violations of a stored snapshot for one module.
#[must_use]
pub fn scope_violations(
    role_permissions: &RolePermissions,
    module_id: &str,
) -> Vec<ScopeViolation> {
    let keys = ScopeKeys::for_module(module_id);
    let view_all = role_permissions.get(&keys.view_all);
    let view_assigned = role_permissions.get(&keys.view_assigned);
    let view = role_permissions.get(&keys.view);

    let mut violations = Vec::new();
    if view_all && view_assigned {
        violations.push(ScopeViolation::ConflictingScopes {
            module_id: module_id.to_owned(),
        });
    }

    if !view {
        violations.extend(
            [(view_all, &keys.view_all), (view_assigned, &keys.view_assigned)]
                .into_iter()
                .filter(|(granted, _)| *granted)
                .map(|(_, key)| ScopeViolation::ScopeWithoutView {
                    scope_key: key.clone(),
                }),
        );
    }

    violations
}

fn is_granted(role_permissions: &RolePermissions, key: &PermissionKey) -> bool {
    role_permissions.get(&key.to_string())
}

fn emit_scope(keys: &ScopeKeys, scope: ViewScope, apply: &mut impl FnMut(&str, bool)) {
    match scope {
        ViewScope::All => {
            apply(&keys.view_all, true);
            apply(&keys.view_assigned, false);
            apply(&keys.view, true);
        }
        ViewScope::Assigned => {
            apply(&keys.view_assigned, true);
            apply(&keys.view_all, false);
            apply(&keys.view, true);
        }
        ViewScope::None => {
            apply(&keys.view, false);
            apply(&keys.view_all, false);
            apply(&keys.view_assigned, false);
        }
    }
}

struct ScopeKeys {
    view: String,
    view_all: String,
    view_assigned: String,
}

impl ScopeKeys {
    fn for_module(module_id: &str) -> Self {
        Self {
            view: PermissionKey::compose(module_id, VIEW_ACTION),
            view_all: PermissionKey::compose(module_id, VIEW_ALL_ACTION),
            view_assigned: PermissionKey::compose(module_id, VIEW_ASSIGNED_ACTION),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::permission::{
        ModulePermissionGroup, PermissionBatch, RolePermissions, ViewScope,
    };

    use super::{
        SelectionState, ScopeViolation, click_select_all, is_allowed, is_group_fully_selected,
        is_group_partially_selected, scope_violations, select_all_for_module, selection_state,
        set_view_scope, toggle_base_permission, view_scope,
    };

    fn products() -> ModulePermissionGroup {
        ModulePermissionGroup::standard("products", "Products", true)
            .unwrap_or_else(|error| panic!("products group should be valid: {error}"))
    }

    fn reports() -> ModulePermissionGroup {
        ModulePermissionGroup::standard("reports", "Reports", false)
            .unwrap_or_else(|error| panic!("reports group should be valid: {error}"))
    }

    fn run(
        role_permissions: &mut RolePermissions,
        operation: impl FnOnce(&RolePermissions, &mut PermissionBatch),
    ) -> PermissionBatch {
        let mut batch = PermissionBatch::new();
        operation(role_permissions, &mut batch);
        batch.apply_to(role_permissions);
        batch
    }

    fn toggle(role_permissions: &mut RolePermissions, group: &ModulePermissionGroup, key: &str) {
        let permission = group
            .find_permission(key)
            .unwrap_or_else(|| panic!("permission '{key}' should be listed"))
            .clone();
        run(role_permissions, |snapshot, batch| {
            toggle_base_permission(snapshot, &permission, |key, value| batch.push(key, value));
        });
    }

    fn expected(entries: &[(&str, bool)]) -> RolePermissions {
        RolePermissions::from_iter(entries.iter().copied())
    }

    fn assert_invariants(role_permissions: &RolePermissions, module_id: &str) {
        let view = role_permissions.get(&format!("{module_id}.view"));
        let view_all = role_permissions.get(&format!("{module_id}.view_all"));
        let view_assigned = role_permissions.get(&format!("{module_id}.view_assigned"));

        assert!(!(view_all && view_assigned), "scopes must be exclusive");
        if view_all || view_assigned {
            assert!(view, "scope implies base view");
        }
        if !view {
            assert!(!view_all && !view_assigned, "revoked view clears scope");
        }
        assert!(scope_violations(role_permissions, module_id).is_empty());
    }

    #[test]
    fn stale_batches_keep_scope_invariants_in_any_order() {
        let group = products();
        let view = group
            .find_permission("products.view")
            .unwrap_or_else(|| panic!("products.view should be listed"))
            .clone();
        let snapshot = expected(&[
            ("products.view", true),
            ("products.view_all", true),
            ("products.view_assigned", false),
        ]);

        let mut turn_off = PermissionBatch::new();
        toggle_base_permission(&snapshot, &view, |key, value| turn_off.push(key, value));
        let mut narrow = PermissionBatch::new();
        set_view_scope(&snapshot, "products", ViewScope::Assigned, |key, value| {
            narrow.push(key, value)
        });

        let mut off_then_narrow = snapshot.clone();
        turn_off.apply_to(&mut off_then_narrow);
        narrow.apply_to(&mut off_then_narrow);
        assert_invariants(&off_then_narrow, "products");
        assert_eq!(view_scope(&off_then_narrow, "products"), ViewScope::Assigned);

        let mut narrow_then_off = snapshot;
        narrow.apply_to(&mut narrow_then_off);
        turn_off.apply_to(&mut narrow_then_off);
        assert_invariants(&narrow_then_off, "products");
        assert_eq!(view_scope(&narrow_then_off, "products"), ViewScope::None);
    }

    #[test]
    fn unknown_keys_are_denied() {
        let role_permissions = expected(&[("products.edit", true)]);
        assert!(is_allowed(&role_permissions, "products.edit"));
        assert!(!is_allowed(&role_permissions, "products.delete"));
        assert!(!is_allowed(&role_permissions, "unknown.anything"));
        assert!(!is_allowed(&RolePermissions::new(), ""));
    }

    #[test]
    fn view_all_wins_over_view_assigned() {
        let corrupted = expected(&[
            ("products.view", true),
            ("products.view_all", true),
            ("products.view_assigned", true),
        ]);
        assert_eq!(view_scope(&corrupted, "products"), ViewScope::All);
        assert_eq!(
            scope_violations(&corrupted, "products"),
            vec![ScopeViolation::ConflictingScopes {
                module_id: "products".to_owned()
            }]
        );
    }

    #[test]
    fn bare_view_defaults_to_all_scope() {
        let role_permissions = expected(&[("products.view", true)]);
        assert_eq!(view_scope(&role_permissions, "products"), ViewScope::All);
    }

    #[test]
    fn missing_view_resolves_to_no_scope() {
        assert_eq!(
            view_scope(&RolePermissions::new(), "products"),
            ViewScope::None
        );
        let revoked = expected(&[("products.view", false), ("products.view_assigned", false)]);
        assert_eq!(view_scope(&revoked, "products"), ViewScope::None);
    }

    #[test]
    fn assigned_scope_is_resolved() {
        let role_permissions = expected(&[
            ("products.view", true),
            ("products.view_all", false),
            ("products.view_assigned", true),
        ]);
        assert_eq!(view_scope(&role_permissions, "products"), ViewScope::Assigned);
    }

    #[test]
    fn set_view_scope_emits_three_writes() {
        for scope in [ViewScope::All, ViewScope::Assigned, ViewScope::None] {
            let mut role_permissions = RolePermissions::new();
            let batch = run(&mut role_permissions, |snapshot, batch| {
                set_view_scope(snapshot, "products", scope, |key, value| batch.push(key, value));
            });
            assert_eq!(batch.writes().len(), 3);
            assert_eq!(view_scope(&role_permissions, "products"), scope);
            assert_invariants(&role_permissions, "products");
        }
    }

    #[test]
    fn scope_scenario_toggle_assign_then_revoke() {
        let group = products();
        let mut role_permissions = RolePermissions::new();

        toggle(&mut role_permissions, &group, "products.view");
        assert_eq!(
            role_permissions,
            expected(&[
                ("products.view", true),
                ("products.view_all", true),
                ("products.view_assigned", false),
            ])
        );

        run(&mut role_permissions, |snapshot, batch| {
            set_view_scope(snapshot, "products", ViewScope::Assigned, |key, value| {
                batch.push(key, value)
            });
        });
        assert_eq!(
            role_permissions,
            expected(&[
                ("products.view", true),
                ("products.view_all", false),
                ("products.view_assigned", true),
            ])
        );

        toggle(&mut role_permissions, &group, "products.view");
        assert_eq!(
            role_permissions,
            expected(&[
                ("products.view", false),
                ("products.view_all", false),
                ("products.view_assigned", false),
            ])
        );
    }

    #[test]
    fn re_enabling_view_resets_assigned_scope_to_all() {
        let group = products();
        let mut role_permissions = expected(&[
            ("products.view", true),
            ("products.view_all", false),
            ("products.view_assigned", true),
        ]);

        toggle(&mut role_permissions, &group, "products.view");
        toggle(&mut role_permissions, &group, "products.view");

        assert_eq!(view_scope(&role_permissions, "products"), ViewScope::All);
        assert_invariants(&role_permissions, "products");
    }

    #[test]
    fn non_scope_permission_toggle_is_a_single_flip() {
        let group = products();
        let mut role_permissions = RolePermissions::new();
        let permission = group
            .find_permission("products.edit")
            .unwrap_or_else(|| panic!("edit should be listed"))
            .clone();

        let batch = run(&mut role_permissions, |snapshot, batch| {
            toggle_base_permission(snapshot, &permission, |key, value| batch.push(key, value));
        });
        assert_eq!(batch.writes().len(), 1);
        assert!(is_allowed(&role_permissions, "products.edit"));

        toggle(&mut role_permissions, &group, "products.edit");
        assert!(!is_allowed(&role_permissions, "products.edit"));
    }

    #[test]
    fn unscoped_module_view_toggle_leaves_scope_keys_alone() {
        let group = reports();
        let mut role_permissions = RolePermissions::new();

        toggle(&mut role_permissions, &group, "reports.view");

        assert_eq!(role_permissions, expected(&[("reports.view", true)]));
    }

    #[test]
    fn select_all_grants_every_permission_with_all_scope() {
        let group = products();
        let mut role_permissions = expected(&[
            ("products.view", true),
            ("products.view_assigned", true),
        ]);

        run(&mut role_permissions, |_, batch| {
            select_all_for_module(&group, true, |key, value| batch.push(key, value));
        });

        assert!(is_group_fully_selected(&group, &role_permissions));
        assert_eq!(view_scope(&role_permissions, "products"), ViewScope::All);
        assert_invariants(&role_permissions, "products");
    }

    #[test]
    fn deselect_all_clears_scope_keys() {
        let group = products();
        let mut role_permissions = RolePermissions::new();
        run(&mut role_permissions, |_, batch| {
            select_all_for_module(&group, true, |key, value| batch.push(key, value));
        });
        run(&mut role_permissions, |_, batch| {
            select_all_for_module(&group, false, |key, value| batch.push(key, value));
        });

        assert!(role_permissions.iter().all(|(_, granted)| !granted));
        assert_eq!(view_scope(&role_permissions, "products"), ViewScope::None);
    }

    #[test]
    fn selection_state_tracks_listed_permissions_only() {
        let group = products();
        let none = RolePermissions::new();
        let some = expected(&[("products.edit", true), ("products.view_all", true)]);
        let all = expected(&[
            ("products.view", true),
            ("products.create", true),
            ("products.edit", true),
            ("products.delete", true),
        ]);

        assert_eq!(selection_state(&group, &none), SelectionState::Unchecked);
        assert_eq!(selection_state(&group, &some), SelectionState::Indeterminate);
        assert_eq!(selection_state(&group, &all), SelectionState::Checked);
        assert!(is_group_partially_selected(&group, &some));
        assert!(!is_group_partially_selected(&group, &all));
    }

    #[test]
    fn empty_group_is_neither_full_nor_partial() {
        let group = ModulePermissionGroup::new("audit", "Audit", Vec::new())
            .unwrap_or_else(|error| panic!("empty group should be valid: {error}"));
        let role_permissions = RolePermissions::new();

        assert!(!is_group_fully_selected(&group, &role_permissions));
        assert!(!is_group_partially_selected(&group, &role_permissions));
    }

    #[test]
    fn clicking_indeterminate_control_selects_everything() {
        let group = products();
        let mut role_permissions = expected(&[("products.edit", true)]);

        run(&mut role_permissions, |snapshot, batch| {
            click_select_all(&group, snapshot, |key, value| batch.push(key, value));
        });
        assert_eq!(selection_state(&group, &role_permissions), SelectionState::Checked);

        run(&mut role_permissions, |snapshot, batch| {
            click_select_all(&group, snapshot, |key, value| batch.push(key, value));
        });
        assert_eq!(
            selection_state(&group, &role_permissions),
            SelectionState::Unchecked
        );
    }

    #[test]
    fn scope_without_view_is_reported() {
        let corrupted = expected(&[("leads.view_assigned", true)]);
        assert_eq!(
            scope_violations(&corrupted, "leads"),
            vec![ScopeViolation::ScopeWithoutView {
                scope_key: "leads.view_assigned".to_owned()
            }]
        );
    }

    #[derive(Debug, Clone)]
    enum Operation {
        Toggle(usize),
        SetScope(ViewScope),
        SelectAll(bool),
        Click,
    }

    fn operation_strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (0usize..4).prop_map(Operation::Toggle),
            prop_oneof![
                Just(ViewScope::All),
                Just(ViewScope::Assigned),
                Just(ViewScope::None),
            ]
            .prop_map(Operation::SetScope),
            any::<bool>().prop_map(Operation::SelectAll),
            Just(Operation::Click),
        ]
    }

    proptest! {
        #[test]
        fn mutations_preserve_scope_invariants(
            operations in proptest::collection::vec(operation_strategy(), 0..32)
        ) {
            let group = products();
            let mut role_permissions = RolePermissions::new();

            for operation in operations {
                match operation {
                    Operation::Toggle(index) => {
                        let permission = group.permissions()[index].clone();
                        run(&mut role_permissions, |snapshot, batch| {
                            toggle_base_permission(snapshot, &permission, |key, value| {
                                batch.push(key, value)
                            });
                        });
                    }
                    Operation::SetScope(scope) => {
                        run(&mut role_permissions, |snapshot, batch| {
                            set_view_scope(snapshot, "products", scope, |key, value| {
                                batch.push(key, value)
                            });
                        });
                    }
                    Operation::SelectAll(checked) => {
                        run(&mut role_permissions, |_, batch| {
                            select_all_for_module(&group, checked, |key, value| {
                                batch.push(key, value)
                            });
                        });
                    }
                    Operation::Click => {
                        run(&mut role_permissions, |snapshot, batch| {
                            click_select_all(&group, snapshot, |key, value| {
                                batch.push(key, value)
                            });
                        });
                    }
                }

                assert_invariants(&role_permissions, "products");
            }
        }
    }
}
