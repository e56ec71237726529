//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_entitlement_repository;
mod in_memory_role_permission_repository;
mod postgres_audit_repository;
mod postgres_entitlement_repository;
mod postgres_role_permission_repository;
mod system_clock;
mod tracing_audit_repository;

pub use in_memory_entitlement_repository::InMemoryEntitlementRepository;
pub use in_memory_role_permission_repository::InMemoryRolePermissionRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_entitlement_repository::PostgresEntitlementRepository;
pub use postgres_role_permission_repository::PostgresRolePermissionRepository;
pub use system_clock::SystemClock;
pub use tracing_audit_repository::TracingAuditRepository;

/// Migrations for every table the Postgres adapters use.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
