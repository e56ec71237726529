use gatehouse_domain::ViewScope;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Decision for a single permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub permission_key: String,
    pub allowed: bool,
}

/// Effective record visibility for one module.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/view-scope-response.ts"
)]
pub struct ViewScopeResponse {
    pub module_id: String,
    pub scope: String,
}

impl ViewScopeResponse {
    pub fn new(module_id: impl Into<String>, scope: ViewScope) -> Self {
        Self {
            module_id: module_id.into(),
            scope: scope.as_str().to_owned(),
        }
    }
}

/// Query string naming the owner of the record being checked.
#[derive(Debug, Deserialize)]
pub struct RecordVisibilityQuery {
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Whether one record of a module is visible to the actor.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/record-visibility-response.ts"
)]
pub struct RecordVisibilityResponse {
    pub module_id: String,
    pub scope: String,
    pub visible: bool,
}
