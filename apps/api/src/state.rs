use gatehouse_application::{AccessControlService, EntitlementService, PermissionEditorService};
use gatehouse_domain::TeaserPolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_control_service: AccessControlService,
    pub permission_editor_service: PermissionEditorService,
    pub entitlement_service: EntitlementService,
    pub teaser_policy: TeaserPolicy,
    pub billing_shared_secret: String,
}
