//! Trial gate: may the current user view a gated resource right now?
//!
//! Pure functions over the cached [`TrialStatus`] snapshot. Nothing here
//! touches the network, and the answer is advisory: the server enforces the
//! same policy per resource and may still refuse (see `api::trial_block`).

mod summary;

pub use summary::TrialSummary;

use crate::models::TrialStatus;

/// How an active trial admits the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialAllowance {
    /// The single free view has not been used yet
    FirstView,
    /// The free view is used but the server still allows more
    Exception,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// No trial applies: another role, a subscriber, or no snapshot at all
    SubscriptionOrNotApplicable,
    TrialActive(TrialAllowance),
    TrialExpired,
    FreeViewConsumed,
}

impl AccessReason {
    pub fn is_allowed(&self) -> bool {
        matches!(
            self,
            AccessReason::SubscriptionOrNotApplicable | AccessReason::TrialActive(_)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessReason::SubscriptionOrNotApplicable => "subscription_or_not_applicable",
            AccessReason::TrialActive(_) => "trial_active",
            AccessReason::TrialExpired => "trial_expired",
            AccessReason::FreeViewConsumed => "free_view_consumed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn from_reason(reason: AccessReason) -> Self {
        Self {
            allowed: reason.is_allowed(),
            reason,
        }
    }
}

/// Decide access to a gated resource from the trial snapshot.
///
/// The decision does not depend on `resource_id`; the server's flags already
/// account for which profile was consumed.
pub fn can_view(trial_status: Option<&TrialStatus>, _resource_id: i64) -> AccessDecision {
    let reason = match trial_status {
        None => AccessReason::SubscriptionOrNotApplicable,
        Some(status) if status.has_subscription => AccessReason::SubscriptionOrNotApplicable,
        Some(status) if !status.is_active => AccessReason::TrialExpired,
        Some(status) if status.has_viewed_free_profile && !status.can_view_more_profiles => {
            AccessReason::FreeViewConsumed
        }
        Some(status) if status.has_viewed_free_profile => {
            AccessReason::TrialActive(TrialAllowance::Exception)
        }
        Some(_) => AccessReason::TrialActive(TrialAllowance::FirstView),
    };
    AccessDecision::from_reason(reason)
}
