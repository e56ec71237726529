use chrono::{DateTime, Utc};
use gatehouse_application::EntitlementOverview;
use gatehouse_core::AppError;
use gatehouse_domain::{Entitlement, PlanTier, TeaserLockState, TrialStatus};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Trial countdown for the current actor.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/trial-status-response.ts"
)]
pub struct TrialStatusResponse {
    pub days_remaining: i64,
    pub is_expired: bool,
    pub is_ending_soon: bool,
    pub phase: String,
}

/// Entitlement snapshot and the tier it currently grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/entitlement-overview-response.ts"
)]
pub struct EntitlementOverviewResponse {
    pub plan_tier: String,
    pub effective_tier: String,
    pub is_trial: bool,
    pub trial_ends_at: Option<String>,
    pub trial_status: Option<TrialStatusResponse>,
}

/// Confirms the actor reaches a required tier.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/tier-access-response.ts"
)]
pub struct TierAccessResponse {
    pub required_tier: String,
    pub effective_tier: String,
}

/// Lock state for one teaser item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/teaser-lock-state-response.ts"
)]
pub struct TeaserLockStateResponse {
    pub index: usize,
    pub is_locked: bool,
}

/// Query string for teaser lock states.
#[derive(Debug, Deserialize)]
pub struct TeaserQuery {
    pub count: usize,
}

/// Billing payload replacing an actor's entitlement snapshot.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/replace-entitlement-request.ts"
)]
pub struct ReplaceEntitlementRequest {
    pub plan_tier: String,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default)]
    pub trial_ends_at: Option<String>,
}

impl ReplaceEntitlementRequest {
    pub fn into_entitlement(self) -> Result<Entitlement, AppError> {
        let plan_tier = PlanTier::from_transport(self.plan_tier.as_str())?;
        let trial_ends_at = self
            .trial_ends_at
            .map(|value| {
                DateTime::parse_from_rfc3339(value.as_str())
                    .map(|instant| instant.with_timezone(&Utc))
                    .map_err(|error| {
                        AppError::Validation(format!("invalid trial_ends_at '{value}': {error}"))
                    })
            })
            .transpose()?;

        if self.is_trial && trial_ends_at.is_none() {
            return Err(AppError::Validation(
                "trial entitlements require trial_ends_at".to_owned(),
            ));
        }

        Ok(Entitlement::new(plan_tier, self.is_trial, trial_ends_at))
    }
}

impl From<TrialStatus> for TrialStatusResponse {
    fn from(value: TrialStatus) -> Self {
        Self {
            days_remaining: value.days_remaining,
            is_expired: value.is_expired,
            is_ending_soon: value.is_ending_soon,
            phase: value.phase().as_str().to_owned(),
        }
    }
}

impl From<EntitlementOverview> for EntitlementOverviewResponse {
    fn from(value: EntitlementOverview) -> Self {
        Self {
            plan_tier: value.entitlement.plan_tier().as_str().to_owned(),
            effective_tier: value.effective_tier.as_str().to_owned(),
            is_trial: value.entitlement.is_trial(),
            trial_ends_at: value
                .entitlement
                .trial_ends_at()
                .map(|instant| instant.to_rfc3339()),
            trial_status: value.trial_status.map(TrialStatusResponse::from),
        }
    }
}

impl TeaserLockStateResponse {
    pub fn from_states(states: Vec<TeaserLockState>) -> Vec<Self> {
        states
            .into_iter()
            .enumerate()
            .map(|(index, state)| Self {
                index,
                is_locked: state.is_locked,
            })
            .collect()
    }
}
