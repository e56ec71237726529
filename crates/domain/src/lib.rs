//! Access-control and entitlement decisions.
//!
//! Both engines are pure: callers pass explicit snapshots and receive fresh
//! answers, so every function here is safe to call from any thread.

#![forbid(unsafe_code)]

mod entitlement;
mod permission;
mod permission_matrix;
mod security;

pub use entitlement::{
    Entitlement, PlanTier, TRIAL_ENDING_SOON_DAYS, TeaserLockState, TeaserPolicy, TeaserStrategy,
    TrialPhase, TrialStatus, effective_tier, is_entitled, is_free_actor, teaser_lock_state,
    teaser_lock_states, trial_status,
};
pub use permission::{
    ModulePermissionGroup, Permission, PermissionBatch, PermissionKey, PermissionWrite,
    RolePermissions, VIEW_ACTION, VIEW_ALL_ACTION, VIEW_ASSIGNED_ACTION, ViewScope,
};
pub use permission_matrix::{
    ScopeViolation, SelectionState, click_select_all, is_allowed, is_group_fully_selected,
    is_group_partially_selected, scope_violations, select_all_for_module, selection_state,
    set_view_scope, toggle_base_permission, view_scope,
};
pub use security::AuditAction;
