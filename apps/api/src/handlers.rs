use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use gatehouse_core::{AppError, RoleId, UserIdentity};
use gatehouse_domain::{PlanTier, ViewScope};

use crate::dto::{
    EntitlementOverviewResponse, HealthResponse, PermissionCheckResponse, RecordVisibilityQuery,
    RecordVisibilityResponse, ReplaceEntitlementRequest, RolePermissionMatrixResponse,
    SetSelectAllRequest, SetViewScopeRequest, TeaserLockStateResponse, TeaserQuery,
    TierAccessResponse, TrialStatusResponse, ViewScopeResponse,
};
use crate::error::ApiResult;
use crate::middleware::BILLING_SUBJECT;
use crate::state::AppState;

mod access;
mod entitlements;
mod health;
mod roles;

pub use access::{permission_check_handler, record_visibility_handler, view_scope_handler};
pub use entitlements::{
    entitlement_overview_handler, replace_entitlement_handler, teaser_lock_states_handler,
    tier_access_handler, trial_status_handler,
};
pub use health::health_handler;
pub use roles::{
    click_select_all_handler, role_permission_matrix_handler, set_select_all_handler,
    set_view_scope_handler, toggle_permission_handler,
};
