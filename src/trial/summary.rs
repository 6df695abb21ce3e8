use std::fmt;

use crate::models::TrialStatus;

/// Banner facts derived from a trial snapshot. Formatting only.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub subscribed: bool,
    pub has_trial: bool,
    pub active: bool,
    pub hours_remaining: Option<f64>,
    pub free_view_used: bool,
}

impl TrialSummary {
    pub fn from_status(status: &TrialStatus) -> Self {
        Self {
            subscribed: status.has_subscription,
            has_trial: status.has_trial,
            active: status.is_active,
            hours_remaining: status.hours_remaining(),
            free_view_used: status.has_viewed_free_profile,
        }
    }
}

impl fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subscribed {
            return write!(f, "Subscription active: unlimited profile access.");
        }
        if !self.has_trial {
            return write!(f, "No trial on this account.");
        }
        if !self.active {
            return write!(f, "Trial expired. Subscribe to keep viewing profiles.");
        }

        match self.hours_remaining {
            Some(hours) => write!(f, "Trial active: {:.1} hours remaining.", hours)?,
            None => write!(f, "Trial active.")?,
        }
        if self.free_view_used {
            write!(f, " Free profile view already used.")
        } else {
            write!(f, " One full profile can be viewed for free.")
        }
    }
}
