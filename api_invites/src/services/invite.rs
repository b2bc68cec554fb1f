use chrono::Utc;
use common::{
    error::{AppError, Res},
    ids,
    misc::normalize_email,
};
use db::{
    Store,
    dtos::invite::InviteCreateRequest,
    error::{constraints, is_violation_of},
    models::invite::Invite,
};
use uuid::Uuid;

/// Records a SENT invite from `inviter_id` to `email`.
///
/// Fails with `SelfInvite` when the email is the inviter's own, and with
/// `DuplicateInvite` when the pair already has an invite in any status.
pub async fn create_invite(store: &dyn Store, inviter_id: Uuid, email: &str) -> Res<Invite> {
    create_invite_with(store, inviter_id, email, ids::new_invite_token).await
}

pub(crate) async fn create_invite_with(
    store: &dyn Store,
    inviter_id: Uuid,
    email: &str,
    next_token: impl FnOnce() -> String,
) -> Res<Invite> {
    let email = normalize_email(email);

    let inviter = store
        .get_user_by_id(inviter_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Inviter not found".to_string()))?;
    if inviter.email == email {
        return Err(AppError::SelfInvite);
    }

    if let Some(existing) = store.get_invite_by_pair(inviter_id, &email).await? {
        return Err(AppError::DuplicateInvite {
            invite_id: Some(existing.id),
        });
    }

    let insert = store
        .insert_invite(InviteCreateRequest {
            inviter_id,
            email: email.clone(),
            token: next_token(),
        })
        .await;

    match insert {
        Ok(invite) => {
            log::info!("Invite {} created by {}", invite.id, inviter_id);
            Ok(invite)
        }
        Err(err) if is_violation_of(&err, constraints::INVITES_INVITER_EMAIL) => {
            // lost a race with a concurrent invite for the same pair
            let invite_id = store
                .get_invite_by_pair(inviter_id, &email)
                .await
                .ok()
                .flatten()
                .map(|invite| invite.id);
            Err(AppError::DuplicateInvite { invite_id })
        }
        Err(err) if is_violation_of(&err, constraints::INVITES_TOKEN) => Err(AppError::Conflict(
            "Invite token collision, please retry".to_string(),
        )),
        Err(err) => Err(err),
    }
}

/// The SENT invite from `inviter_id` to `email`, if any.
pub async fn find_pending_invite(
    store: &dyn Store,
    inviter_id: Uuid,
    email: &str,
) -> Res<Option<Invite>> {
    store
        .get_pending_invite(inviter_id, &normalize_email(email))
        .await
}

/// Marks an invite ACCEPTED. Accepting an already accepted invite returns it
/// unchanged, keeping the first `accepted_at`.
pub async fn accept_invite(store: &dyn Store, invite_id: Uuid) -> Res<Invite> {
    let now = Utc::now().naive_utc();
    if let Some(invite) = store.mark_invite_accepted(invite_id, now).await? {
        log::info!("Invite {} accepted", invite.id);
        return Ok(invite);
    }

    store
        .get_invite_by_id(invite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))
}

/// Invites sent by `inviter_id`, newest first.
pub async fn list_invites(store: &dyn Store, inviter_id: Uuid) -> Res<Vec<Invite>> {
    store.get_invites_by_inviter(inviter_id).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use db::{
        MemoryStore, dtos::user::UserCreateRequest, models::invite::InviteStatus,
        models::user::User, testing::StalePrechecks,
    };

    use super::*;

    async fn user(store: &dyn Store, email: &str, code: &str) -> User {
        store
            .insert_user(UserCreateRequest {
                email: email.to_string(),
                referral_code: code.to_string(),
                password_hash: "hash".to_string(),
                name: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creates_a_sent_invite_with_lowercase_email() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;

        let invite = create_invite(&store, inviter.id, "  Friend@X.com ")
            .await
            .unwrap();

        assert_eq!(invite.email, "friend@x.com");
        assert_eq!(invite.status, InviteStatus::Sent);
        assert!(invite.accepted_at.is_none());
        assert_eq!(invite.token.len(), ids::INVITE_TOKEN_LEN);
    }

    #[tokio::test]
    async fn rejects_inviting_yourself() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;

        let err = create_invite(&store, inviter.id, "A@X.com").await.unwrap_err();

        assert!(matches!(err, AppError::SelfInvite));
        assert_eq!(store.count_rows().await.unwrap().invites, 0);
    }

    #[tokio::test]
    async fn unknown_inviter_is_not_found() {
        let store = MemoryStore::new();
        let err = create_invite(&store, Uuid::new_v4(), "b@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn second_invite_to_the_same_email_is_a_duplicate() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        let first = create_invite(&store, inviter.id, "b@x.com").await.unwrap();

        let err = create_invite(&store, inviter.id, "B@x.com")
            .await
            .unwrap_err();

        match err {
            AppError::DuplicateInvite { invite_id } => assert_eq!(invite_id, Some(first.id)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count_rows().await.unwrap().invites, 1);
    }

    #[tokio::test]
    async fn accepted_invites_still_block_a_new_invite() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        let first = create_invite(&store, inviter.id, "b@x.com").await.unwrap();
        accept_invite(&store, first.id).await.unwrap();

        let err = create_invite(&store, inviter.id, "b@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateInvite { .. }));
    }

    #[tokio::test]
    async fn racing_duplicate_is_translated_from_the_constraint() {
        let inner = Arc::new(MemoryStore::new());
        let inviter = user(inner.as_ref(), "a@x.com", "AAAAAA").await;
        let first = create_invite(inner.as_ref(), inviter.id, "b@x.com")
            .await
            .unwrap();

        let stale = StalePrechecks::new(inner.clone());
        let err = create_invite(&stale, inviter.id, "b@x.com")
            .await
            .unwrap_err();

        // the re-fetch goes through the stale wrapper too
        assert!(matches!(err, AppError::DuplicateInvite { invite_id: None }));
        assert_eq!(inner.count_rows().await.unwrap().invites, 1);
        assert!(inner.get_invite_by_id(first.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn token_collision_is_a_conflict() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        create_invite_with(&store, inviter.id, "c@x.com", || "fixed".to_string())
            .await
            .unwrap();

        let err = create_invite_with(&store, inviter.id, "b@x.com", || "fixed".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.count_rows().await.unwrap().invites, 1);
    }

    #[tokio::test]
    async fn different_inviters_may_invite_the_same_email() {
        let store = MemoryStore::new();
        let a = user(&store, "a@x.com", "AAAAAA").await;
        let b = user(&store, "b@x.com", "BBBBBB").await;

        create_invite(&store, a.id, "c@x.com").await.unwrap();
        create_invite(&store, b.id, "c@x.com").await.unwrap();

        assert_eq!(store.count_rows().await.unwrap().invites, 2);
    }

    #[tokio::test]
    async fn accepting_twice_keeps_the_first_timestamp() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        let invite = create_invite(&store, inviter.id, "b@x.com").await.unwrap();

        let first = accept_invite(&store, invite.id).await.unwrap();
        let second = accept_invite(&store, invite.id).await.unwrap();

        assert_eq!(first.status, InviteStatus::Accepted);
        assert!(first.accepted_at.is_some());
        assert_eq!(second.status, InviteStatus::Accepted);
        assert_eq!(second.accepted_at, first.accepted_at);
    }

    #[tokio::test]
    async fn accepting_an_unknown_invite_is_not_found() {
        let store = MemoryStore::new();
        let err = accept_invite(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn pending_lookup_ignores_accepted_invites() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        let invite = create_invite(&store, inviter.id, "b@x.com").await.unwrap();

        let pending = find_pending_invite(&store, inviter.id, "B@X.com")
            .await
            .unwrap();
        assert_eq!(pending.map(|i| i.id), Some(invite.id));

        accept_invite(&store, invite.id).await.unwrap();
        assert!(
            find_pending_invite(&store, inviter.id, "b@x.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryStore::new();
        let inviter = user(&store, "a@x.com", "AAAAAA").await;
        create_invite(&store, inviter.id, "b@x.com").await.unwrap();
        let newest = create_invite(&store, inviter.id, "c@x.com").await.unwrap();

        let invites = list_invites(&store, inviter.id).await.unwrap();
        assert_eq!(invites.len(), 2);
        assert_eq!(invites[0].id, newest.id);
    }
}
