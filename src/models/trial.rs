//! Trial snapshot for the gated role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_timestamp;

/// Verbatim copy of the server's `GET /users/trial-status` answer.
///
/// Every field is optional on the wire: subscribed accounts only receive
/// `has_trial`, `has_subscription` and `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialStatus {
    pub has_trial: bool,
    pub is_active: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub trial_start: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub trial_end: Option<DateTime<Utc>>,
    pub hours_remaining: Option<f64>,
    pub has_viewed_free_profile: bool,
    pub can_view_more_profiles: bool,
    pub has_subscription: bool,
    pub viewed_profile_id: Option<i64>,
    pub message: Option<String>,
}

impl TrialStatus {
    /// Hours left in the window, never negative.
    pub fn hours_remaining(&self) -> Option<f64> {
        self.hours_remaining.map(|h| h.max(0.0))
    }

    /// Time left before the window closes, measured against `now`.
    pub fn time_left(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.trial_end
            .map(|end| (end - now).max(chrono::Duration::zero()))
    }
}
