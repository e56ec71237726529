use gatehouse_application::{ModulePermissionState, PermissionGrantState, RolePermissionMatrix};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for view scope changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-view-scope-request.ts"
)]
pub struct SetViewScopeRequest {
    pub scope: String,
}

/// Incoming payload for a module select-all checkbox.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/set-select-all-request.ts"
)]
pub struct SetSelectAllRequest {
    pub checked: bool,
}

/// One permission row of the editor matrix.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-grant-response.ts"
)]
pub struct PermissionGrantResponse {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    pub supports_scope: bool,
    pub granted: bool,
}

/// One module group of the editor matrix.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/module-permission-state-response.ts"
)]
pub struct ModulePermissionStateResponse {
    pub module_id: String,
    pub module_name: String,
    pub selection: String,
    pub view_scope: Option<String>,
    pub permissions: Vec<PermissionGrantResponse>,
}

/// Full permission matrix for a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-permission-matrix-response.ts"
)]
pub struct RolePermissionMatrixResponse {
    pub role_id: String,
    pub modules: Vec<ModulePermissionStateResponse>,
}

impl From<PermissionGrantState> for PermissionGrantResponse {
    fn from(value: PermissionGrantState) -> Self {
        Self {
            key: value.permission.key().to_string(),
            label: value.permission.label().to_owned(),
            description: value.permission.description().map(str::to_owned),
            supports_scope: value.permission.supports_scope(),
            granted: value.granted,
        }
    }
}

impl From<ModulePermissionState> for ModulePermissionStateResponse {
    fn from(value: ModulePermissionState) -> Self {
        Self {
            module_id: value.module_id,
            module_name: value.module_name,
            selection: value.selection.as_str().to_owned(),
            view_scope: value.view_scope.map(|scope| scope.as_str().to_owned()),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionGrantResponse::from)
                .collect(),
        }
    }
}

impl From<RolePermissionMatrix> for RolePermissionMatrixResponse {
    fn from(value: RolePermissionMatrix) -> Self {
        Self {
            role_id: value.role_id.as_str().to_owned(),
            modules: value
                .modules
                .into_iter()
                .map(ModulePermissionStateResponse::from)
                .collect(),
        }
    }
}
