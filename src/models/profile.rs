//! Influencer profile, the gated resource.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub instagram_handle: Option<String>,
    pub instagram_followers: Option<i64>,
    pub tiktok_handle: Option<String>,
    pub tiktok_followers: Option<i64>,
    pub youtube_handle: Option<String>,
    pub youtube_subscribers: Option<i64>,
    pub average_engagement_rate: Option<f64>,
    pub suggested_rate_per_post: Option<f64>,
    pub total_campaigns_completed: i64,
    pub average_rating: Option<f64>,
}

impl Profile {
    /// Display handle, preferring Instagram like the profile page does.
    pub fn display_handle(&self) -> String {
        self.instagram_handle
            .as_deref()
            .or(self.tiktok_handle.as_deref())
            .or(self.youtube_handle.as_deref())
            .filter(|h| !h.is_empty())
            .map(|h| format!("@{}", h))
            .unwrap_or_else(|| format!("profile #{}", self.id))
    }
}
