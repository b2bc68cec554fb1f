use db::models::invite::{Invite, InviteStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InviteSummary {
    pub id: Uuid,
    pub email: String,
    pub token: String,
    pub status: InviteStatus,
}

impl From<Invite> for InviteSummary {
    fn from(invite: Invite) -> Self {
        InviteSummary {
            id: invite.id,
            email: invite.email,
            token: invite.token,
            status: invite.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteResponse {
    pub success: bool,
    pub invite: InviteSummary,
    pub invite_url: String,
}
