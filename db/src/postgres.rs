use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::{invite::InviteCreateRequest, referral::ReferralCreateRequest, user::UserCreateRequest},
    invite,
    models::{
        invite::Invite,
        referral::{Referral, ReferralListItem},
        user::User,
    },
    referral,
    store::{Store, TableCounts},
    user,
};

/// Store backed by a Postgres connection pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_user_by_id(&self, user_id: Uuid) -> Res<Option<User>> {
        user::get_user_by_id(&self.pool, user_id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Res<Option<User>> {
        user::get_user_by_email(&self.pool, email).await
    }

    async fn get_user_by_referral_code(&self, referral_code: &str) -> Res<Option<User>> {
        user::get_user_by_referral_code(&self.pool, referral_code).await
    }

    async fn insert_user(&self, data: UserCreateRequest) -> Res<User> {
        user::insert_user(&self.pool, data).await
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Res<Option<User>> {
        user::update_password_hash(&self.pool, user_id, password_hash).await
    }

    async fn get_invite_by_id(&self, invite_id: Uuid) -> Res<Option<Invite>> {
        invite::get_invite_by_id(&self.pool, invite_id).await
    }

    async fn get_invite_by_pair(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>> {
        invite::get_invite_by_pair(&self.pool, inviter_id, email).await
    }

    async fn get_pending_invite(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>> {
        invite::get_pending_invite(&self.pool, inviter_id, email).await
    }

    async fn get_invites_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Invite>> {
        invite::get_invites_by_inviter(&self.pool, inviter_id).await
    }

    async fn insert_invite(&self, data: InviteCreateRequest) -> Res<Invite> {
        invite::insert_invite(&self.pool, data).await
    }

    async fn mark_invite_accepted(
        &self,
        invite_id: Uuid,
        accepted_at: NaiveDateTime,
    ) -> Res<Option<Invite>> {
        invite::mark_invite_accepted(&self.pool, invite_id, accepted_at).await
    }

    async fn get_referral_by_signup_user(&self, signup_user_id: Uuid) -> Res<Option<Referral>> {
        referral::get_referral_by_signup_user(&self.pool, signup_user_id).await
    }

    async fn get_referrals_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Referral>> {
        referral::get_referrals_by_inviter(&self.pool, inviter_id).await
    }

    async fn get_referral_list_by_inviter(
        &self,
        inviter_id: Uuid,
    ) -> Res<Vec<ReferralListItem>> {
        referral::get_referral_list_by_inviter(&self.pool, inviter_id).await
    }

    async fn insert_referral(&self, data: ReferralCreateRequest) -> Res<Referral> {
        referral::insert_referral(&self.pool, data).await
    }

    async fn count_rows(&self) -> Res<TableCounts> {
        Ok(TableCounts {
            users: user::count_users(&self.pool).await?,
            invites: invite::count_invites(&self.pool).await?,
            referrals: referral::count_referrals(&self.pool).await?,
        })
    }
}
