use std::sync::Arc;

use gatehouse_application::{
    AccessControlService, AuditRepository, Clock, EntitlementRepository, EntitlementService,
    ModuleCatalog, PermissionEditorService, RolePermissionRepository,
};
use gatehouse_core::{AppResult, RoleId};
use gatehouse_domain::{PermissionBatch, select_all_for_module};
use gatehouse_infrastructure::{
    InMemoryEntitlementRepository, InMemoryRolePermissionRepository, PostgresAuditRepository,
    PostgresEntitlementRepository, PostgresRolePermissionRepository, SystemClock,
    TracingAuditRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

struct Repositories {
    role_permissions: Arc<dyn RolePermissionRepository>,
    entitlements: Arc<dyn EntitlementRepository>,
    audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    fn postgres(pool: PgPool) -> Self {
        Self {
            role_permissions: Arc::new(PostgresRolePermissionRepository::new(pool.clone())),
            entitlements: Arc::new(PostgresEntitlementRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool)),
        }
    }

    fn in_memory() -> Self {
        Self {
            role_permissions: Arc::new(InMemoryRolePermissionRepository::new()),
            entitlements: Arc::new(InMemoryEntitlementRepository::new()),
            audit: Arc::new(TracingAuditRepository),
        }
    }
}

pub async fn build_app_state(config: ApiConfig, pool: Option<PgPool>) -> AppResult<AppState> {
    let repositories = match pool {
        Some(pool) => Repositories::postgres(pool),
        None => {
            info!("DATABASE_URL not set, using in-memory repositories");
            Repositories::in_memory()
        }
    };
    let catalog = Arc::new(config.catalog);

    if let Some(role_id) = &config.bootstrap_admin_role {
        grant_full_catalog(repositories.role_permissions.as_ref(), &catalog, role_id).await?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let access_control_service = AccessControlService::new(repositories.role_permissions.clone());

    Ok(AppState {
        permission_editor_service: PermissionEditorService::new(
            access_control_service.clone(),
            repositories.role_permissions,
            repositories.audit.clone(),
            catalog,
        ),
        access_control_service,
        entitlement_service: EntitlementService::new(
            repositories.entitlements,
            repositories.audit,
            clock,
        ),
        teaser_policy: config.teaser_policy,
        billing_shared_secret: config.billing_shared_secret,
    })
}

/// Grants every catalog permission to the role, with `All` scope where supported.
pub async fn grant_full_catalog(
    repository: &dyn RolePermissionRepository,
    catalog: &ModuleCatalog,
    role_id: &RoleId,
) -> AppResult<()> {
    let mut batch = PermissionBatch::new();
    for group in catalog.groups() {
        select_all_for_module(group, true, |key, value| batch.push(key, value));
    }

    repository
        .apply_permission_writes(role_id, batch.into_writes())
        .await?;

    info!(role_id = %role_id, "bootstrap role granted full catalog");
    Ok(())
}
