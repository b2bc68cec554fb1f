//! Store wrappers for exercising error paths in tests.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::Res;
use uuid::Uuid;

use crate::{
    dtos::{invite::InviteCreateRequest, referral::ReferralCreateRequest, user::UserCreateRequest},
    models::{
        invite::Invite,
        referral::{Referral, ReferralListItem},
        user::User,
    },
    store::{Store, TableCounts},
};

/// Simulates a concurrent writer: the duplicate pre-checks (user by email,
/// invite by pair, referral by signup user) always miss, so uniqueness is
/// only caught by the inner store's constraints.
pub struct StalePrechecks {
    inner: Arc<dyn Store>,
}

impl StalePrechecks {
    pub fn new(inner: Arc<dyn Store>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Store for StalePrechecks {
    async fn get_user_by_id(&self, user_id: Uuid) -> Res<Option<User>> {
        self.inner.get_user_by_id(user_id).await
    }

    async fn get_user_by_email(&self, _email: &str) -> Res<Option<User>> {
        Ok(None)
    }

    async fn get_user_by_referral_code(&self, referral_code: &str) -> Res<Option<User>> {
        self.inner.get_user_by_referral_code(referral_code).await
    }

    async fn insert_user(&self, data: UserCreateRequest) -> Res<User> {
        self.inner.insert_user(data).await
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Res<Option<User>> {
        self.inner.set_password_hash(user_id, password_hash).await
    }

    async fn get_invite_by_id(&self, invite_id: Uuid) -> Res<Option<Invite>> {
        self.inner.get_invite_by_id(invite_id).await
    }

    async fn get_invite_by_pair(&self, _inviter_id: Uuid, _email: &str) -> Res<Option<Invite>> {
        Ok(None)
    }

    async fn get_pending_invite(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>> {
        self.inner.get_pending_invite(inviter_id, email).await
    }

    async fn get_invites_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Invite>> {
        self.inner.get_invites_by_inviter(inviter_id).await
    }

    async fn insert_invite(&self, data: InviteCreateRequest) -> Res<Invite> {
        self.inner.insert_invite(data).await
    }

    async fn mark_invite_accepted(
        &self,
        invite_id: Uuid,
        accepted_at: NaiveDateTime,
    ) -> Res<Option<Invite>> {
        self.inner.mark_invite_accepted(invite_id, accepted_at).await
    }

    async fn get_referral_by_signup_user(&self, _signup_user_id: Uuid) -> Res<Option<Referral>> {
        Ok(None)
    }

    async fn get_referrals_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Referral>> {
        self.inner.get_referrals_by_inviter(inviter_id).await
    }

    async fn get_referral_list_by_inviter(
        &self,
        inviter_id: Uuid,
    ) -> Res<Vec<ReferralListItem>> {
        self.inner.get_referral_list_by_inviter(inviter_id).await
    }

    async fn insert_referral(&self, data: ReferralCreateRequest) -> Res<Referral> {
        self.inner.insert_referral(data).await
    }

    async fn count_rows(&self) -> Res<TableCounts> {
        self.inner.count_rows().await
    }
}
