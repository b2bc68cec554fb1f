use uuid::Uuid;

pub struct ReferralCreateRequest {
    pub inviter_id: Uuid,
    pub signup_user_id: Uuid,
    pub invite_id: Option<Uuid>,
}
