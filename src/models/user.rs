//! User identity and credential payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::deserialize_timestamp;

/// Closed set of account roles. Unrecognised values land on `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "EMPRESA")]
    Company,
    #[serde(rename = "INFLUENCER")]
    Influencer,
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Whether this role is subject to the trial/paywall gate.
    pub fn is_gated(&self) -> bool {
        matches!(self, UserRole::Company)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Company => "EMPRESA",
            UserRole::Influencer => "INFLUENCER",
            UserRole::Admin => "ADMIN",
            UserRole::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "company" | "empresa" => Ok(UserRole::Company),
            "influencer" => Ok(UserRole::Influencer),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!(
                "unknown role '{}' (expected company, influencer or admin)",
                other
            )),
        }
    }
}

/// Identity record returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub has_active_subscription: bool,
    /// Trial anchor, absent for accounts that never started a trial
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub trial_start_time: Option<DateTime<Utc>>,
    /// The one profile already consumed as the free view
    #[serde(default)]
    pub trial_profile_viewed_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: UserRole,
}

impl RegisterRequest {
    /// Credentials reused for the automatic login after registration.
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .finish()
    }
}
