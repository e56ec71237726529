mod audit;
mod catalog;
mod clock;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use catalog::{ModuleCatalog, ROLE_EDIT_PERMISSION};
pub use clock::Clock;
pub use repositories::{EntitlementRepository, RolePermissionRepository};
