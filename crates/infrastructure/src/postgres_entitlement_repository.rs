use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use gatehouse_application::EntitlementRepository;
use gatehouse_core::{AppError, AppResult};
use gatehouse_domain::{Entitlement, PlanTier};

/// PostgreSQL-backed store of entitlement snapshots.
#[derive(Clone)]
pub struct PostgresEntitlementRepository {
    pool: PgPool,
}

impl PostgresEntitlementRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EntitlementRow {
    plan_tier: String,
    is_trial: bool,
    trial_ends_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl EntitlementRepository for PostgresEntitlementRepository {
    async fn find_entitlement(&self, subject: &str) -> AppResult<Option<Entitlement>> {
        let row = sqlx::query_as::<_, EntitlementRow>(
            r#"
            SELECT plan_tier, is_trial, trial_ends_at
            FROM entitlements
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load entitlement for subject '{subject}': {error}"
            ))
        })?;

        row.map(|row| {
            let plan_tier = PlanTier::from_str(row.plan_tier.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode plan tier '{}' for subject '{subject}': {error}",
                    row.plan_tier
                ))
            })?;

            Ok(Entitlement::new(plan_tier, row.is_trial, row.trial_ends_at))
        })
        .transpose()
    }

    async fn save_entitlement(&self, subject: &str, entitlement: Entitlement) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO entitlements (subject, plan_tier, is_trial, trial_ends_at, updated_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (subject)
            DO UPDATE SET
                plan_tier = EXCLUDED.plan_tier,
                is_trial = EXCLUDED.is_trial,
                trial_ends_at = EXCLUDED.trial_ends_at,
                updated_at = now()
            "#,
        )
        .bind(subject)
        .bind(entitlement.plan_tier().as_str())
        .bind(entitlement.is_trial())
        .bind(entitlement.trial_ends_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save entitlement for subject '{subject}': {error}"
            ))
        })?;

        Ok(())
    }
}
