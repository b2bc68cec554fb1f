use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use common::error::{AppError, DependencyKind, Res};
use uuid::Uuid;

use crate::{
    dtos::{invite::InviteCreateRequest, referral::ReferralCreateRequest, user::UserCreateRequest},
    error::constraints,
    models::{
        invite::{Invite, InviteStatus},
        referral::{LinkedInvite, Referral, ReferralListItem, ReferredUser},
        user::User,
    },
    store::{Store, TableCounts},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    invites: Vec<Invite>,
    referrals: Vec<Referral>,
}

/// In-process store selected by `memory://` URLs.
///
/// Each call runs under a single lock, so constraint checks and inserts are
/// atomic the way they are in Postgres. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failures: Mutex<HashMap<&'static str, DependencyKind>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call of the named `Store` method fail with a
    /// dependency error of the given kind.
    pub fn fail_operation(&self, operation: &'static str, kind: DependencyKind) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(operation, kind);
        }
    }

    fn check(&self, operation: &'static str) -> Res<()> {
        let failures = self
            .failures
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))?;
        match failures.get(operation) {
            Some(kind) => Err(AppError::Dependency {
                kind: *kind,
                detail: format!("{} failed", operation),
            }),
            None => Ok(()),
        }
    }

    fn tables(&self, operation: &'static str) -> Res<MutexGuard<'_, Tables>> {
        self.check(operation)?;
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn violation(constraint: &str) -> AppError {
    AppError::UniqueViolation(constraint.to_string())
}

fn missing_reference() -> AppError {
    AppError::BadRequest("Referenced record does not exist".to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user_by_id(&self, user_id: Uuid) -> Res<Option<User>> {
        let tables = self.tables("get_user_by_id")?;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Res<Option<User>> {
        let tables = self.tables("get_user_by_email")?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_referral_code(&self, referral_code: &str) -> Res<Option<User>> {
        let tables = self.tables("get_user_by_referral_code")?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.referral_code == referral_code)
            .cloned())
    }

    async fn insert_user(&self, data: UserCreateRequest) -> Res<User> {
        let mut tables = self.tables("insert_user")?;
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(violation(constraints::USERS_EMAIL));
        }
        if tables
            .users
            .iter()
            .any(|u| u.referral_code == data.referral_code)
        {
            return Err(violation(constraints::USERS_REFERRAL_CODE));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            referral_code: data.referral_code,
            password_hash: data.password_hash,
            name: data.name,
            created_at: now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Res<Option<User>> {
        let mut tables = self.tables("set_password_hash")?;
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .map(|user| {
                user.password_hash = password_hash.to_string();
                user.clone()
            }))
    }

    async fn get_invite_by_id(&self, invite_id: Uuid) -> Res<Option<Invite>> {
        let tables = self.tables("get_invite_by_id")?;
        Ok(tables.invites.iter().find(|i| i.id == invite_id).cloned())
    }

    async fn get_invite_by_pair(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>> {
        let tables = self.tables("get_invite_by_pair")?;
        Ok(tables
            .invites
            .iter()
            .find(|i| i.inviter_id == inviter_id && i.email == email)
            .cloned())
    }

    async fn get_pending_invite(&self, inviter_id: Uuid, email: &str) -> Res<Option<Invite>> {
        let tables = self.tables("get_pending_invite")?;
        Ok(tables
            .invites
            .iter()
            .find(|i| i.inviter_id == inviter_id && i.email == email && !i.is_accepted())
            .cloned())
    }

    async fn get_invites_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Invite>> {
        let tables = self.tables("get_invites_by_inviter")?;
        Ok(tables
            .invites
            .iter()
            .rev()
            .filter(|i| i.inviter_id == inviter_id)
            .cloned()
            .collect())
    }

    async fn insert_invite(&self, data: InviteCreateRequest) -> Res<Invite> {
        let mut tables = self.tables("insert_invite")?;
        if !tables.users.iter().any(|u| u.id == data.inviter_id) {
            return Err(missing_reference());
        }
        if tables.invites.iter().any(|i| i.token == data.token) {
            return Err(violation(constraints::INVITES_TOKEN));
        }
        if tables
            .invites
            .iter()
            .any(|i| i.inviter_id == data.inviter_id && i.email == data.email)
        {
            return Err(violation(constraints::INVITES_INVITER_EMAIL));
        }

        let invite = Invite {
            id: Uuid::new_v4(),
            inviter_id: data.inviter_id,
            email: data.email,
            token: data.token,
            status: InviteStatus::Sent,
            created_at: now(),
            accepted_at: None,
        };
        tables.invites.push(invite.clone());
        Ok(invite)
    }

    async fn mark_invite_accepted(
        &self,
        invite_id: Uuid,
        accepted_at: NaiveDateTime,
    ) -> Res<Option<Invite>> {
        let mut tables = self.tables("mark_invite_accepted")?;
        let Some(invite) = tables
            .invites
            .iter_mut()
            .find(|i| i.id == invite_id && i.status == InviteStatus::Sent)
        else {
            return Ok(None);
        };
        invite.status = InviteStatus::Accepted;
        invite.accepted_at = Some(accepted_at);
        Ok(Some(invite.clone()))
    }

    async fn get_referral_by_signup_user(&self, signup_user_id: Uuid) -> Res<Option<Referral>> {
        let tables = self.tables("get_referral_by_signup_user")?;
        Ok(tables
            .referrals
            .iter()
            .find(|r| r.signup_user_id == signup_user_id)
            .cloned())
    }

    async fn get_referrals_by_inviter(&self, inviter_id: Uuid) -> Res<Vec<Referral>> {
        let tables = self.tables("get_referrals_by_inviter")?;
        Ok(tables
            .referrals
            .iter()
            .rev()
            .filter(|r| r.inviter_id == inviter_id)
            .cloned()
            .collect())
    }

    async fn get_referral_list_by_inviter(
        &self,
        inviter_id: Uuid,
    ) -> Res<Vec<ReferralListItem>> {
        let tables = self.tables("get_referral_list_by_inviter")?;
        let items = tables
            .referrals
            .iter()
            .rev()
            .filter(|r| r.inviter_id == inviter_id)
            .filter_map(|r| {
                let signup_user = tables.users.iter().find(|u| u.id == r.signup_user_id)?;
                let invite = r
                    .invite_id
                    .and_then(|id| tables.invites.iter().find(|i| i.id == id))
                    .map(|i| LinkedInvite {
                        id: i.id,
                        email: i.email.clone(),
                        status: i.status,
                    });
                Some(ReferralListItem {
                    id: r.id,
                    created_at: r.created_at,
                    signup_user: ReferredUser {
                        id: signup_user.id,
                        email: signup_user.email.clone(),
                        name: signup_user.name.clone(),
                        created_at: signup_user.created_at,
                    },
                    invite,
                })
            })
            .collect();
        Ok(items)
    }

    async fn insert_referral(&self, data: ReferralCreateRequest) -> Res<Referral> {
        let mut tables = self.tables("insert_referral")?;
        let users_exist = [data.inviter_id, data.signup_user_id]
            .iter()
            .all(|id| tables.users.iter().any(|u| u.id == *id));
        let invite_exists = data
            .invite_id
            .is_none_or(|id| tables.invites.iter().any(|i| i.id == id));
        if !users_exist || !invite_exists {
            return Err(missing_reference());
        }
        if tables
            .referrals
            .iter()
            .any(|r| r.signup_user_id == data.signup_user_id)
        {
            return Err(violation(constraints::REFERRALS_SIGNUP_USER));
        }

        let referral = Referral {
            id: Uuid::new_v4(),
            inviter_id: data.inviter_id,
            signup_user_id: data.signup_user_id,
            invite_id: data.invite_id,
            created_at: now(),
        };
        tables.referrals.push(referral.clone());
        Ok(referral)
    }

    async fn count_rows(&self) -> Res<TableCounts> {
        let tables = self.tables("count_rows")?;
        Ok(TableCounts {
            users: tables.users.len() as i64,
            invites: tables.invites.len() as i64,
            referrals: tables.referrals.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_request(email: &str, code: &str) -> UserCreateRequest {
        UserCreateRequest {
            email: email.to_string(),
            referral_code: code.to_string(),
            password_hash: "hash".to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn enforces_unique_email_and_code() {
        let store = MemoryStore::new();
        store.insert_user(user_request("a@x.com", "AAAAAA")).await.unwrap();

        let err = store
            .insert_user(user_request("a@x.com", "BBBBBB"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UniqueViolation(c) if c == constraints::USERS_EMAIL));

        let err = store
            .insert_user(user_request("b@x.com", "AAAAAA"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::UniqueViolation(c) if c == constraints::USERS_REFERRAL_CODE)
        );
        assert_eq!(store.count_rows().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn replaces_password_hash_for_known_users_only() {
        let store = MemoryStore::new();
        let user = store.insert_user(user_request("a@x.com", "AAAAAA")).await.unwrap();

        let updated = store.set_password_hash(user.id, "rehashed").await.unwrap();
        assert_eq!(updated.map(|u| u.password_hash), Some("rehashed".to_string()));
        let stored = store.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "rehashed");

        assert!(store.set_password_hash(Uuid::new_v4(), "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepts_invites_once() {
        let store = MemoryStore::new();
        let inviter = store.insert_user(user_request("a@x.com", "AAAAAA")).await.unwrap();
        let invite = store
            .insert_invite(InviteCreateRequest {
                inviter_id: inviter.id,
                email: "b@x.com".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap();

        let first = now();
        let accepted = store
            .mark_invite_accepted(invite.id, first)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert_eq!(accepted.accepted_at, Some(first));

        assert!(store.mark_invite_accepted(invite.id, now()).await.unwrap().is_none());
        assert!(
            store
                .get_pending_invite(inviter.id, "b@x.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn rejects_invites_from_unknown_users() {
        let store = MemoryStore::new();
        let err = store
            .insert_invite(InviteCreateRequest {
                inviter_id: Uuid::new_v4(),
                email: "b@x.com".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryStore::new();
        let inviter = store.insert_user(user_request("a@x.com", "AAAAAA")).await.unwrap();
        for (i, email) in ["b@x.com", "c@x.com"].iter().enumerate() {
            store
                .insert_invite(InviteCreateRequest {
                    inviter_id: inviter.id,
                    email: email.to_string(),
                    token: format!("t{}", i),
                })
                .await
                .unwrap();
        }

        let invites = store.get_invites_by_inviter(inviter.id).await.unwrap();
        let emails: Vec<&str> = invites.iter().map(|i| i.email.as_str()).collect();
        assert_eq!(emails, vec!["c@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_dependency_errors() {
        let store = MemoryStore::new();
        store.fail_operation("count_rows", DependencyKind::SchemaNotInitialized);

        let err = store.count_rows().await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Dependency {
                kind: DependencyKind::SchemaNotInitialized,
                ..
            }
        ));
        assert!(store.get_user_by_email("a@x.com").await.is_ok());
    }
}
