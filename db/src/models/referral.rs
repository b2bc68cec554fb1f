use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::invite::InviteStatus;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub signup_user_id: Uuid,
    pub invite_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

/// Referral joined with the public fields of the referred user and the
/// invite it came from, as listed on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralListItem {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    pub signup_user: ReferredUser,
    pub invite: Option<LinkedInvite>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferredUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInvite {
    pub id: Uuid,
    pub email: String,
    pub status: InviteStatus,
}
