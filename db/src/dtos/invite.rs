use uuid::Uuid;

pub struct InviteCreateRequest {
    pub inviter_id: Uuid,
    pub email: String,
    pub token: String,
}
