use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use gatehouse_application::RolePermissionRepository;
use gatehouse_core::{AppError, AppResult, RoleId};
use gatehouse_domain::{PermissionWrite, RolePermissions};

/// PostgreSQL-backed store of role permission snapshots.
#[derive(Clone)]
pub struct PostgresRolePermissionRepository {
    pool: PgPool,
}

impl PostgresRolePermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    permission_key: String,
    granted: bool,
}

fn snapshot_from_rows(rows: Vec<RolePermissionRow>) -> RolePermissions {
    rows.into_iter()
        .map(|row| (row.permission_key, row.granted))
        .collect()
}

const SELECT_ROLE_PERMISSIONS: &str = r#"
    SELECT permission_key, granted
    FROM role_permissions
    WHERE role_id = $1
    ORDER BY permission_key
"#;

#[async_trait]
impl RolePermissionRepository for PostgresRolePermissionRepository {
    async fn find_role_permissions(&self, role_id: &RoleId) -> AppResult<RolePermissions> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(SELECT_ROLE_PERMISSIONS)
            .bind(role_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to load permissions for role '{role_id}': {error}"
                ))
            })?;

        Ok(snapshot_from_rows(rows))
    }

    async fn apply_permission_writes(
        &self,
        role_id: &RoleId,
        writes: Vec<PermissionWrite>,
    ) -> AppResult<RolePermissions> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start permission transaction for role '{role_id}': {error}"
            ))
        })?;

        for write in &writes {
            upsert_permission(&mut transaction, role_id, write).await?;
        }

        let rows = sqlx::query_as::<_, RolePermissionRow>(SELECT_ROLE_PERMISSIONS)
            .bind(role_id.as_str())
            .fetch_all(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to reload permissions for role '{role_id}': {error}"
                ))
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit permission transaction for role '{role_id}': {error}"
            ))
        })?;

        Ok(snapshot_from_rows(rows))
    }
}

async fn upsert_permission(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: &RoleId,
    write: &PermissionWrite,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_key, granted, updated_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (role_id, permission_key)
        DO UPDATE SET
            granted = EXCLUDED.granted,
            updated_at = now()
        "#,
    )
    .bind(role_id.as_str())
    .bind(write.key.as_str())
    .bind(write.value)
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to write permission '{}' for role '{role_id}': {error}",
            write.key
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests;
