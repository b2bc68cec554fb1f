use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::Res;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    dtos::{invite::InviteCreateRequest, referral::ReferralCreateRequest, user::UserCreateRequest},
    models::{
        invite::Invite,
        referral::{Referral, ReferralListItem},
        user::User,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: i64,
    pub invites: i64,
    pub referrals: i64,
}

/// Query interface over the users, invites and referrals tables.
///
/// Implementations enforce the unique constraints named in
/// [`crate::error::constraints`] atomically and report violations as
/// `AppError::UniqueViolation`. Lookups take already normalised emails and
/// referral codes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_user_by_id(&self, user_id: Uuid) -> Res<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Res<Option<User>>;
    async fn get_user_by_referral_code(&self, referral_code: &str) -> Res<Option<User>>;
    async fn insert_user(&self, data: UserCreateRequest) -> Res<User>;
    /// Replaces the credential hash. Returns `None` for an unknown user.
    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Res<Option<User>>;

    async fn get_invite_by_id(&self, invite_id: Uuid) -> Res<Option<Invite>>;
    async fn get_invite_by_pair(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>>;
    async fn get_pending_invite(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>>;
    /// Newest first.
    async fn get_invites_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Invite>>;
    async fn insert_invite(&self, data: InviteCreateRequest) -> Res<Invite>;
    /// Moves a SENT invite to ACCEPTED. Returns `None` if no SENT invite has this id.
    async fn mark_invite_accepted(
        &self,
        invite_id: Uuid,
        accepted_at: NaiveDateTime,
    ) -> Res<Option<Invite>>;

    async fn get_referral_by_signup_user(&self, signup_user_id: Uuid) -> Res<Option<Referral>>;
    /// Newest first.
    async fn get_referrals_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Referral>>;
    /// Newest first, joined with the referred user and linked invite.
    async fn get_referral_list_by_inviter(&self, inviter_id: Uuid)
    -> Res<Vec<ReferralListItem>>;
    async fn insert_referral(&self, data: ReferralCreateRequest) -> Res<Referral>;

    async fn count_rows(&self) -> Res<TableCounts>;
}
