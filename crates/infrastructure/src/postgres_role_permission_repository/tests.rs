use gatehouse_application::RolePermissionRepository;
use gatehouse_core::RoleId;
use gatehouse_domain::{PermissionWrite, ViewScope, view_scope};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::MIGRATOR;

use super::PostgresRolePermissionRepository;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres role permission tests: {error}");
    }

    Some(pool)
}

fn unique_role() -> RoleId {
    RoleId::new(format!("role-{}", Uuid::new_v4()))
        .unwrap_or_else(|error| panic!("role id: {error}"))
}

fn write(key: &str, value: bool) -> PermissionWrite {
    PermissionWrite {
        key: key.to_owned(),
        value,
    }
}

#[tokio::test]
async fn unknown_role_has_empty_snapshot() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRolePermissionRepository::new(pool);
    let snapshot = repository.find_role_permissions(&unique_role()).await;

    assert!(snapshot.is_ok_and(|snapshot| snapshot.is_empty()));
}

#[tokio::test]
async fn batch_writes_overwrite_existing_entries() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRolePermissionRepository::new(pool);
    let role_id = unique_role();

    let first = repository
        .apply_permission_writes(
            &role_id,
            vec![
                write("products.view_all", true),
                write("products.view_assigned", false),
                write("products.view", true),
            ],
        )
        .await;
    assert!(first.is_ok_and(|snapshot| view_scope(&snapshot, "products") == ViewScope::All));

    let second = repository
        .apply_permission_writes(
            &role_id,
            vec![
                write("products.view_assigned", true),
                write("products.view_all", false),
                write("products.view", true),
            ],
        )
        .await;
    assert!(second.is_ok());

    let stored = repository.find_role_permissions(&role_id).await;
    assert!(stored.is_ok_and(|snapshot| {
        snapshot.len() == 3 && view_scope(&snapshot, "products") == ViewScope::Assigned
    }));
}
