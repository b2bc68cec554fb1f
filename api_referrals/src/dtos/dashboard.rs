use db::models::{invite::Invite, referral::ReferralListItem, user::User};
use serde::Serialize;
use uuid::Uuid;

use crate::services::metrics::Metrics;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub display_name: String,
    pub referral_code: String,
}

impl From<&User> for DashboardUser {
    fn from(user: &User) -> Self {
        DashboardUser {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            display_name: user.display_name().to_string(),
            referral_code: user.referral_code.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: DashboardUser,
    pub referral_url: String,
    pub invites: Vec<Invite>,
    pub referrals: Vec<ReferralListItem>,
    pub metrics: Metrics,
}
