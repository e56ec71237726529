use serde::Serialize;
use ts_rs::TS;

mod access;
mod editor;
mod entitlements;

pub use access::{
    PermissionCheckResponse, RecordVisibilityQuery, RecordVisibilityResponse, ViewScopeResponse,
};
pub use editor::{RolePermissionMatrixResponse, SetSelectAllRequest, SetViewScopeRequest};
pub use entitlements::{
    EntitlementOverviewResponse, ReplaceEntitlementRequest, TeaserLockStateResponse, TeaserQuery,
    TierAccessResponse, TrialStatusResponse,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}
