use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gatehouse_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Base read action every module exposes.
pub const VIEW_ACTION: &str = "view";
/// Scope action granting visibility over every record of a module.
pub const VIEW_ALL_ACTION: &str = "view_all";
/// Scope action restricting visibility to records assigned to the actor.
pub const VIEW_ASSIGNED_ACTION: &str = "view_assigned";

/// Parsed `"<module>.<action>"` permission key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey {
    module_id: NonEmptyString,
    action: NonEmptyString,
}

impl PermissionKey {
    /// Creates a permission key from its module and action parts.
    pub fn new(module_id: impl Into<String>, action: impl Into<String>) -> AppResult<Self> {
        let module_id = module_id.into();
        let action = action.into();
        if module_id.contains('.') {
            return Err(AppError::Validation(format!(
                "module id '{module_id}' must not contain '.'"
            )));
        }

        Ok(Self {
            module_id: NonEmptyString::new(module_id)?,
            action: NonEmptyString::new(action)?,
        })
    }

    /// Builds the `<module>.<action>` string without validating either part.
    #[must_use]
    pub fn compose(module_id: &str, action: &str) -> String {
        format!("{module_id}.{action}")
    }

    /// Returns the module part of the key.
    #[must_use]
    pub fn module_id(&self) -> &str {
        self.module_id.as_str()
    }

    /// Returns the action part of the key.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns whether this key is a module's base `view` permission.
    #[must_use]
    pub fn is_base_view(&self) -> bool {
        self.action() == VIEW_ACTION
    }

    /// Returns whether this key is one of the derived view-scope keys.
    #[must_use]
    pub fn is_scope_key(&self) -> bool {
        matches!(self.action(), VIEW_ALL_ACTION | VIEW_ASSIGNED_ACTION)
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((module_id, action)) = value.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission key '{value}' must have the form '<module>.<action>'"
            )));
        };

        Self::new(module_id, action)
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<PermissionKey> for String {
    fn from(value: PermissionKey) -> Self {
        value.to_string()
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.module_id, self.action)
    }
}

/// Resolved permission set for one role.
///
/// Keys that are absent read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissions(BTreeMap<String, bool>);

impl RolePermissions {
    /// Creates an empty snapshot that denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the stored value for a key, treating absence as `false`.
    #[must_use]
    pub fn get(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Stores a value for a key.
    pub fn set(&mut self, key: impl Into<String>, value: bool) {
        self.0.insert(key.into(), value);
    }

    /// Iterates stored entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no entry is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for RolePermissions {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// One `(key, value)` write emitted by a permission mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionWrite {
    /// Permission key to write.
    pub key: String,
    /// Value to store for the key.
    pub value: bool,
}

/// Ordered collection of writes that must be persisted together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionBatch {
    writes: Vec<PermissionWrite>,
}

impl PermissionBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// Records one write; usable directly as the `apply` callback target.
    pub fn push(&mut self, key: &str, value: bool) {
        self.writes.push(PermissionWrite {
            key: key.to_owned(),
            value,
        });
    }

    /// Returns the recorded writes in emission order.
    #[must_use]
    pub fn writes(&self) -> &[PermissionWrite] {
        self.writes.as_slice()
    }

    /// Returns whether no write was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Applies every recorded write to a snapshot in one step.
    pub fn apply_to(&self, role_permissions: &mut RolePermissions) {
        for write in &self.writes {
            role_permissions.set(write.key.clone(), write.value);
        }
    }

    /// Consumes the batch and returns its writes.
    #[must_use]
    pub fn into_writes(self) -> Vec<PermissionWrite> {
        self.writes
    }
}

/// One grantable capability shown in the permission editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    key: PermissionKey,
    label: NonEmptyString,
    description: Option<String>,
    supports_scope: bool,
}

impl Permission {
    /// Creates a validated permission descriptor.
    ///
    /// Only a module's base `view` permission may support scope.
    pub fn new(
        key: PermissionKey,
        label: impl Into<String>,
        description: Option<String>,
        supports_scope: bool,
    ) -> AppResult<Self> {
        if key.is_scope_key() {
            return Err(AppError::Validation(format!(
                "scope key '{key}' is derived and cannot be listed as a permission"
            )));
        }

        if supports_scope && !key.is_base_view() {
            return Err(AppError::Validation(format!(
                "only a module's '{VIEW_ACTION}' permission can support scope, got '{key}'"
            )));
        }

        let description = description.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(Self {
            key,
            label: NonEmptyString::new(label)?,
            description,
            supports_scope,
        })
    }

    /// Returns the permission key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether this is a base `view` permission with record ownership.
    #[must_use]
    pub fn supports_scope(&self) -> bool {
        self.supports_scope
    }
}

/// Permissions of one protected module, grouped for administration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModulePermissionGroup {
    module_id: NonEmptyString,
    module_name: NonEmptyString,
    permissions: Vec<Permission>,
}

impl ModulePermissionGroup {
    /// Creates a validated module group.
    pub fn new(
        module_id: impl Into<String>,
        module_name: impl Into<String>,
        permissions: Vec<Permission>,
    ) -> AppResult<Self> {
        let module_id = NonEmptyString::new(module_id)?;

        if let Some(foreign) = permissions
            .iter()
            .find(|permission| permission.key().module_id() != module_id.as_str())
        {
            return Err(AppError::Validation(format!(
                "permission '{}' does not belong to module '{}'",
                foreign.key(),
                module_id
            )));
        }

        let mut seen = std::collections::BTreeSet::new();
        for permission in &permissions {
            if !seen.insert(permission.key().to_string()) {
                return Err(AppError::Validation(format!(
                    "permission '{}' is listed more than once in module '{}'",
                    permission.key(),
                    module_id
                )));
            }
        }

        Ok(Self {
            module_id,
            module_name: NonEmptyString::new(module_name)?,
            permissions,
        })
    }

    /// Builds the conventional view/create/edit/delete group for a module.
    pub fn standard(
        module_id: &str,
        module_name: &str,
        has_record_ownership: bool,
    ) -> AppResult<Self> {
        let permissions = [
            (VIEW_ACTION, "View", has_record_ownership),
            ("create", "Create", false),
            ("edit", "Edit", false),
            ("delete", "Delete", false),
        ]
        .into_iter()
        .map(|(action, verb, supports_scope)| {
            Permission::new(
                PermissionKey::new(module_id, action)?,
                format!("{verb} {}", module_name.to_lowercase()),
                None,
                supports_scope,
            )
        })
        .collect::<AppResult<Vec<_>>>()?;

        Self::new(module_id, module_name, permissions)
    }

    /// Returns the module identifier.
    #[must_use]
    pub fn module_id(&self) -> &str {
        self.module_id.as_str()
    }

    /// Returns the module display name.
    #[must_use]
    pub fn module_name(&self) -> &str {
        self.module_name.as_str()
    }

    /// Returns permissions in display order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    /// Finds a listed permission by its full key.
    #[must_use]
    pub fn find_permission(&self, key: &str) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.key().to_string() == key)
    }

    /// Returns whether the module has a base view permission with scope.
    #[must_use]
    pub fn supports_scope(&self) -> bool {
        self.permissions.iter().any(Permission::supports_scope)
    }
}

/// Record visibility a role has inside one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewScope {
    /// Every record of the module.
    All,
    /// Only records assigned to the acting user.
    Assigned,
    /// No record at all.
    None,
}

impl ViewScope {
    /// Returns a stable transport value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Assigned => "assigned",
            Self::None => "none",
        }
    }

    /// Parses a transport value into a scope.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for ViewScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "assigned" => Ok(Self::Assigned),
            "none" => Ok(Self::None),
            _ => Err(AppError::Validation(format!(
                "unknown view scope value '{value}'"
            ))),
        }
    }
}
