/// Email and referral code must already be normalised.
pub struct UserCreateRequest {
    pub email: String,
    pub referral_code: String,
    pub password_hash: String,
    pub name: Option<String>,
}
