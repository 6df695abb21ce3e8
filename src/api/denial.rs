//! Translation of server denials into typed outcomes.
//!
//! The backend signals business-rule denials through the `detail` text. All
//! string matching on that text lives here. A structured `code` wins over
//! the text whenever the server sends one.

use reqwest::StatusCode;

use super::ApiError;
use crate::trial::AccessReason;

const PENDING_APPROVAL_DETAIL: &str = "pending approval";
const INACTIVE_DETAIL: &str = "inactive";
const FREE_PROFILE_DETAIL: &str = "free profile";

const PENDING_APPROVAL_CODE: &str = "pending_approval";
const INACTIVE_CODE: &str = "account_inactive";
const TRIAL_EXPIRED_CODE: &str = "trial_expired";
const FREE_PROFILE_CODE: &str = "free_profile_limit_reached";

/// Why a login attempt was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginDenial {
    /// 401: wrong email or password
    InvalidCredentials,
    /// 403: the account exists but an admin has not approved it yet
    PendingApproval,
    /// 403: the account was disabled
    Inactive(String),
    /// Anything else, surfaced verbatim
    Other,
}

impl LoginDenial {
    pub fn classify(err: &ApiError) -> Self {
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) => LoginDenial::InvalidCredentials,
            Some(StatusCode::FORBIDDEN) => {
                let detail = err.detail().unwrap_or_default();
                match err.code() {
                    Some(PENDING_APPROVAL_CODE) => LoginDenial::PendingApproval,
                    Some(INACTIVE_CODE) => LoginDenial::Inactive(detail.to_string()),
                    _ if detail.contains(PENDING_APPROVAL_DETAIL) => LoginDenial::PendingApproval,
                    _ if detail.contains(INACTIVE_DETAIL) => {
                        LoginDenial::Inactive(detail.to_string())
                    }
                    _ => LoginDenial::Other,
                }
            }
            _ => LoginDenial::Other,
        }
    }
}

/// Server-side trial enforcement on a gated resource, if that is what `err` is.
///
/// 402 always means the trial window closed. A 403 only counts when it names
/// the free view; other 403s are ordinary authorization failures.
pub fn trial_block(err: &ApiError) -> Option<AccessReason> {
    match err.status()? {
        StatusCode::PAYMENT_REQUIRED => Some(AccessReason::TrialExpired),
        StatusCode::FORBIDDEN => {
            let by_code = match err.code() {
                Some(TRIAL_EXPIRED_CODE) => Some(AccessReason::TrialExpired),
                Some(FREE_PROFILE_CODE) => Some(AccessReason::FreeViewConsumed),
                _ => None,
            };
            by_code.or_else(|| {
                err.detail()
                    .filter(|d| d.contains(FREE_PROFILE_DETAIL))
                    .map(|_| AccessReason::FreeViewConsumed)
            })
        }
        _ => None,
    }
}
