use std::sync::Arc;

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{
    AuditAction, Entitlement, PlanTier, TeaserLockState, TeaserPolicy, TrialStatus,
    effective_tier, is_entitled, is_free_actor, teaser_lock_states, trial_status,
};
use tracing::{debug, info};

use crate::{AuditEvent, AuditRepository, Clock, EntitlementRepository};

/// Plan facts of one actor evaluated at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementOverview {
    /// Snapshot the facts were derived from.
    pub entitlement: Entitlement,
    /// Tier the actor is entitled to right now.
    pub effective_tier: PlanTier,
    /// Trial facts, when the snapshot is a trial.
    pub trial_status: Option<TrialStatus>,
}

/// Application service computing plan-derived visibility for actors.
///
/// The clock is read on every call; no result is cached across calls.
#[derive(Clone)]
pub struct EntitlementService {
    repository: Arc<dyn EntitlementRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl EntitlementService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn EntitlementRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
            clock,
        }
    }

    /// Returns the actor's snapshot, or the free snapshot when billing has none.
    pub async fn entitlement(&self, actor: &UserIdentity) -> AppResult<Entitlement> {
        Ok(self
            .repository
            .find_entitlement(actor.subject())
            .await?
            .unwrap_or_else(Entitlement::free))
    }

    /// Returns the actor's plan facts at the current instant.
    pub async fn overview(&self, actor: &UserIdentity) -> AppResult<EntitlementOverview> {
        let entitlement = self.entitlement(actor).await?;
        let now = self.clock.now();

        Ok(EntitlementOverview {
            effective_tier: effective_tier(&entitlement, now),
            trial_status: trial_status(&entitlement, now),
            entitlement,
        })
    }

    /// Returns the actor's trial facts at the current instant.
    pub async fn trial_status(&self, actor: &UserIdentity) -> AppResult<Option<TrialStatus>> {
        let entitlement = self.entitlement(actor).await?;
        Ok(trial_status(&entitlement, self.clock.now()))
    }

    /// Returns the tier the actor holds at the current instant, after any
    /// trial downgrade.
    pub async fn effective_tier(&self, actor: &UserIdentity) -> AppResult<PlanTier> {
        let entitlement = self.entitlement(actor).await?;
        Ok(effective_tier(&entitlement, self.clock.now()))
    }

    /// Returns whether the actor reaches the tier at the current instant.
    pub async fn is_entitled(
        &self,
        actor: &UserIdentity,
        required_tier: PlanTier,
    ) -> AppResult<bool> {
        let entitlement = self.entitlement(actor).await?;
        let entitled = is_entitled(&entitlement, required_tier, self.clock.now());
        debug!(
            subject = actor.subject(),
            required_tier = required_tier.as_str(),
            entitled,
            "evaluated entitlement"
        );

        Ok(entitled)
    }

    /// Ensures the actor reaches the tier at the current instant.
    pub async fn require_tier(
        &self,
        actor: &UserIdentity,
        required_tier: PlanTier,
    ) -> AppResult<()> {
        if self.is_entitled(actor, required_tier).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' requires plan '{}'",
            actor.subject(),
            required_tier.as_str()
        )))
    }

    /// Returns per-item lock states for a listing of `count` items.
    pub async fn teaser_lock_states(
        &self,
        actor: &UserIdentity,
        count: usize,
        policy: &TeaserPolicy,
    ) -> AppResult<Vec<TeaserLockState>> {
        let entitlement = self.entitlement(actor).await?;
        let is_free = is_free_actor(&entitlement, self.clock.now());

        Ok(teaser_lock_states(count, is_free, policy))
    }

    /// Replaces an actor's snapshot on behalf of the billing collaborator.
    pub async fn record_entitlement(
        &self,
        billing_subject: &str,
        subject: &str,
        entitlement: Entitlement,
    ) -> AppResult<()> {
        if subject.trim().is_empty() {
            return Err(AppError::Validation(
                "entitlement subject must not be empty".to_owned(),
            ));
        }

        let detail = format!(
            "plan_tier={} is_trial={} trial_ends_at={}",
            entitlement.plan_tier().as_str(),
            entitlement.is_trial(),
            entitlement
                .trial_ends_at()
                .map(|value| value.to_rfc3339())
                .unwrap_or_else(|| "none".to_owned())
        );

        self.repository
            .save_entitlement(subject, entitlement)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: billing_subject.to_owned(),
                action: AuditAction::EntitlementReplaced,
                resource_type: "entitlement".to_owned(),
                resource_id: subject.to_owned(),
                detail: Some(detail),
            })
            .await?;

        info!(subject, "entitlement replaced");
        Ok(())
    }
}
