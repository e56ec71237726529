//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_service;
mod access_ports;
mod entitlement_service;
mod permission_editor_service;

#[cfg(test)]
mod test_support;

pub use access_control_service::AccessControlService;
pub use access_ports::{
    AuditEvent, AuditRepository, Clock, EntitlementRepository, ModuleCatalog,
    ROLE_EDIT_PERMISSION, RolePermissionRepository,
};
pub use entitlement_service::{EntitlementOverview, EntitlementService};
pub use permission_editor_service::{
    ModulePermissionState, PermissionEditorService, PermissionGrantState, RolePermissionMatrix,
};
