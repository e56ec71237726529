//! Plan-tier entitlements, trial lifecycle and teaser locking.
//!
//! Trial facts depend on the instant they are evaluated at, so every function
//! takes `now` explicitly and nothing here is cached.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use gatehouse_core::AppError;
use serde::{Deserialize, Serialize};

/// Days before expiry at which a trial counts as ending soon.
pub const TRIAL_ENDING_SOON_DAYS: i64 = 3;

/// Subscription plan tier, ordered from least to most entitled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    /// No paid plan.
    Free,
    /// Professional plan.
    Pro,
    /// Enterprise plan.
    Enterprise,
}

impl PlanTier {
    /// Returns a stable storage value for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parses a transport value into a tier.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for PlanTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(AppError::Validation(format!(
                "unknown plan tier value '{value}'"
            ))),
        }
    }
}

/// Per-actor plan snapshot written by the billing collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    plan_tier: PlanTier,
    is_trial: bool,
    trial_ends_at: Option<DateTime<Utc>>,
}

impl Entitlement {
    /// Creates an entitlement snapshot.
    ///
    /// `trial_ends_at` is trusted as given; billing owns its validation.
    #[must_use]
    pub fn new(plan_tier: PlanTier, is_trial: bool, trial_ends_at: Option<DateTime<Utc>>) -> Self {
        Self {
            plan_tier,
            is_trial,
            trial_ends_at,
        }
    }

    /// Snapshot for an actor billing has no record of.
    #[must_use]
    pub fn free() -> Self {
        Self::new(PlanTier::Free, false, None)
    }

    /// Snapshot for a paid plan that is not backed by a trial.
    #[must_use]
    pub fn paid(plan_tier: PlanTier) -> Self {
        Self::new(plan_tier, false, None)
    }

    /// Snapshot for a plan granted through a trial ending at `trial_ends_at`.
    #[must_use]
    pub fn trial(plan_tier: PlanTier, trial_ends_at: DateTime<Utc>) -> Self {
        Self::new(plan_tier, true, Some(trial_ends_at))
    }

    /// Returns the nominal plan tier.
    #[must_use]
    pub fn plan_tier(&self) -> PlanTier {
        self.plan_tier
    }

    /// Returns whether the plan is granted through a trial.
    #[must_use]
    pub fn is_trial(&self) -> bool {
        self.is_trial
    }

    /// Returns the trial end instant, if any.
    #[must_use]
    pub fn trial_ends_at(&self) -> Option<DateTime<Utc>> {
        self.trial_ends_at
    }
}

/// Conceptual trial lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    /// More than the ending-soon threshold remains.
    Active,
    /// Within the ending-soon threshold.
    EndingSoon,
    /// Trial end instant has passed.
    Expired,
}

impl TrialPhase {
    /// Returns a stable transport value for this phase.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::EndingSoon => "ending_soon",
            Self::Expired => "expired",
        }
    }
}

/// Trial facts derived from an entitlement at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialStatus {
    /// Whole days left, rounded up; zero once expired.
    pub days_remaining: i64,
    /// Whether the trial end instant has passed.
    pub is_expired: bool,
    /// Whether the trial is still running but within the ending-soon window.
    pub is_ending_soon: bool,
}

impl TrialStatus {
    /// Returns the lifecycle phase these facts place the trial in.
    #[must_use]
    pub fn phase(&self) -> TrialPhase {
        if self.is_expired {
            TrialPhase::Expired
        } else if self.is_ending_soon {
            TrialPhase::EndingSoon
        } else {
            TrialPhase::Active
        }
    }
}

/// How a teaser list decides which items stay visible to free actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeaserStrategy {
    /// The first `free_visible_count` items are visible, the rest locked.
    FirstNItems,
    /// Every item is locked.
    LockAll,
}

impl TeaserStrategy {
    /// Returns a stable transport value for this strategy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstNItems => "first-n-items",
            Self::LockAll => "lock-all",
        }
    }
}

impl FromStr for TeaserStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "first-n-items" => Ok(Self::FirstNItems),
            "lock-all" => Ok(Self::LockAll),
            _ => Err(AppError::Validation(format!(
                "unknown teaser strategy value '{value}'"
            ))),
        }
    }
}

/// Teaser configuration for one content listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaserPolicy {
    /// Locking strategy.
    pub strategy: TeaserStrategy,
    /// Number of leading items free actors may see.
    pub free_visible_count: usize,
}

impl TeaserPolicy {
    /// Creates a `first-n-items` policy.
    #[must_use]
    pub fn first_n_items(free_visible_count: usize) -> Self {
        Self {
            strategy: TeaserStrategy::FirstNItems,
            free_visible_count,
        }
    }
}

/// Lock decision for one listed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeaserLockState {
    /// Whether the item renders as a locked placeholder.
    pub is_locked: bool,
}

/// Computes trial facts, or `None` when the entitlement is not a trial or
/// carries no end instant.
#[must_use]
pub fn trial_status(entitlement: &Entitlement, now: DateTime<Utc>) -> Option<TrialStatus> {
    if !entitlement.is_trial() {
        return None;
    }
    let trial_ends_at = entitlement.trial_ends_at()?;

    let is_expired = now > trial_ends_at;
    let days_remaining = if is_expired {
        0
    } else {
        let remaining = trial_ends_at - now;
        let whole_days = remaining.num_days();
        whole_days + i64::from(remaining > Duration::days(whole_days))
    };
    let is_ending_soon =
        !is_expired && days_remaining > 0 && days_remaining <= TRIAL_ENDING_SOON_DAYS;

    Some(TrialStatus {
        days_remaining,
        is_expired,
        is_ending_soon,
    })
}

/// Returns the tier an entitlement grants at `now`.
///
/// A trial whose end has passed grants [`PlanTier::Free`]. Plans that are not
/// trials are returned unchanged.
#[must_use]
pub fn effective_tier(entitlement: &Entitlement, now: DateTime<Utc>) -> PlanTier {
    match trial_status(entitlement, now) {
        Some(status) if status.is_expired => PlanTier::Free,
        _ => entitlement.plan_tier(),
    }
}

/// Returns whether the entitlement reaches `required_tier` at `now`.
#[must_use]
pub fn is_entitled(
    entitlement: &Entitlement,
    required_tier: PlanTier,
    now: DateTime<Utc>,
) -> bool {
    effective_tier(entitlement, now) >= required_tier
}

/// Returns whether teaser policies should treat the actor as non-paying.
#[must_use]
pub fn is_free_actor(entitlement: &Entitlement, now: DateTime<Utc>) -> bool {
    effective_tier(entitlement, now) == PlanTier::Free
}

/// Decides whether the item at a zero-based index is locked.
#[must_use]
pub fn teaser_lock_state(
    index: usize,
    is_free_actor: bool,
    policy: &TeaserPolicy,
) -> TeaserLockState {
    let is_locked = is_free_actor
        && match policy.strategy {
            TeaserStrategy::FirstNItems => index >= policy.free_visible_count,
            TeaserStrategy::LockAll => true,
        };

    TeaserLockState { is_locked }
}

/// Evaluates [`teaser_lock_state`] for every index of a list.
#[must_use]
pub fn teaser_lock_states(
    count: usize,
    is_free_actor: bool,
    policy: &TeaserPolicy,
) -> Vec<TeaserLockState> {
    (0..count)
        .map(|index| teaser_lock_state(index, is_free_actor, policy))
        .collect()
}
