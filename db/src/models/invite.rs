use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum InviteStatus {
    Sent,
    Accepted,
}

/// `accepted_at` is set exactly when `status` is `Accepted`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub email: String,
    pub token: String,
    pub status: InviteStatus,
    pub created_at: NaiveDateTime,
    pub accepted_at: Option<NaiveDateTime>,
}

impl Invite {
    pub fn is_accepted(&self) -> bool {
        self.status == InviteStatus::Accepted
    }
}
