//! Gated profile viewing for company accounts.

use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{endpoints, trial_block};
use crate::models::Profile;
use crate::session::{SessionError, SessionManager};
use crate::trial::{can_view, AccessReason};

const EXPIRED_MESSAGE: &str =
    "Your 24-hour trial has expired. Subscribe to keep viewing influencer profiles.";
const FREE_VIEW_MESSAGE: &str =
    "You already used your free profile view. Subscribe to unlock every profile.";

/// What a UI shows instead of a profile the trial does not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct PaywallNotice {
    pub reason: AccessReason,
    pub message: String,
    pub subscribe_path: String,
}

impl PaywallNotice {
    fn new(reason: AccessReason, server_detail: Option<&str>, subscribe_path: &str) -> Self {
        let message = match server_detail {
            Some(detail) if !detail.is_empty() => detail.to_string(),
            _ => match reason {
                AccessReason::FreeViewConsumed => FREE_VIEW_MESSAGE.to_string(),
                _ => EXPIRED_MESSAGE.to_string(),
            },
        };
        Self {
            reason,
            message,
            subscribe_path: subscribe_path.to_string(),
        }
    }
}

impl fmt::Display for PaywallNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (subscribe at {})", self.message, self.subscribe_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileView {
    Granted(Box<Profile>),
    Paywall(PaywallNotice),
}

pub struct ProfileViewer {
    session: Arc<SessionManager>,
}

impl ProfileViewer {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Open a profile, or explain why the trial does not cover it.
    ///
    /// The local gate answers first so a denied view costs no request. The
    /// server has the last word: a 402 or a free-profile 403 turns into the
    /// same paywall. The trial snapshot is refreshed after every fetch that
    /// reached the server, since a first view consumes the free allowance.
    pub async fn view(&self, profile_id: i64) -> Result<ProfileView, SessionError> {
        let subscribe_path = &self.session.routes().subscribe;
        let snapshot = self.session.snapshot();

        let decision = can_view(snapshot.trial_status.as_ref(), profile_id);
        if !decision.allowed {
            info!(profile_id, reason = decision.reason.as_str(), "Profile blocked by trial gate");
            return Ok(ProfileView::Paywall(PaywallNotice::new(
                decision.reason,
                None,
                subscribe_path,
            )));
        }

        let result = self
            .session
            .client()
            .get_json::<Profile>(&endpoints::profile(profile_id))
            .await;

        match result {
            Ok(profile) => {
                self.session.refresh_trial_status().await;
                info!(profile_id, reason = decision.reason.as_str(), "Profile opened");
                Ok(ProfileView::Granted(Box::new(profile)))
            }
            Err(err) => match trial_block(&err) {
                Some(reason) => {
                    warn!(profile_id, reason = reason.as_str(), "Server refused profile for trial");
                    self.session.refresh_trial_status().await;
                    Ok(ProfileView::Paywall(PaywallNotice::new(
                        reason,
                        err.detail(),
                        subscribe_path,
                    )))
                }
                None => Err(err.into()),
            },
        }
    }
}
