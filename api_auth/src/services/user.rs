use api_invites::services::invite::{accept_invite, find_pending_invite};
use api_referrals::services::referral::create_referral;
use common::{
    error::{AppError, Res},
    ids,
    misc::{normalize_email, normalize_referral_code, parse_email},
};
use db::{
    Store,
    dtos::user::UserCreateRequest,
    error::{constraints, is_violation_of},
    models::{referral::Referral, user::User},
};
use uuid::Uuid;

use crate::services::credentials;

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 5;

/// A new account and, when the signup came through a referral code, the
/// referral it was credited to.
#[derive(Debug)]
pub struct Registration {
    pub user: User,
    pub referral_id: Option<Uuid>,
}

/// Looks up a user by email, case-insensitively.
pub async fn find_by_email(store: &dyn Store, email: &str) -> Res<Option<User>> {
    store.get_user_by_email(&normalize_email(email)).await
}

/// Creates an account from signup input.
///
/// All validation happens before anything is written. Once the user row
/// exists, accepting the matching invite and recording the referral are
/// best-effort: failures are logged and `referral_id` is left empty.
pub async fn register_user(
    store: &dyn Store,
    email: Option<&str>,
    password: Option<&str>,
    referral_code: Option<&str>,
) -> Res<Registration> {
    register_user_with(store, email, password, referral_code, ids::new_referral_code).await
}

pub(crate) async fn register_user_with(
    store: &dyn Store,
    email: Option<&str>,
    password: Option<&str>,
    referral_code: Option<&str>,
    mut next_code: impl FnMut() -> String,
) -> Res<Registration> {
    let email = parse_email(email)?;
    let password = password
        .filter(|password| password.chars().count() >= MIN_PASSWORD_LEN)
        .ok_or_else(|| {
            AppError::BadRequest(
                "password is required and must be at least 6 characters".to_string(),
            )
        })?;

    if let Some(existing) = store.get_user_by_email(&email).await? {
        return Err(AppError::DuplicateEmail {
            user_id: Some(existing.id),
        });
    }

    let inviter = match referral_code
        .map(normalize_referral_code)
        .filter(|code| !code.is_empty())
    {
        Some(code) => {
            let inviter = store
                .get_user_by_referral_code(&code)
                .await?
                .ok_or(AppError::InvalidReferralCode)?;
            if inviter.email == email {
                return Err(AppError::SelfReferral);
            }
            Some(inviter)
        }
        None => None,
    };

    let password_hash = credentials::hash_password(password.to_string()).await?;

    let mut attempt = 1;
    let user = loop {
        let insert = store
            .insert_user(UserCreateRequest {
                email: email.clone(),
                referral_code: next_code(),
                password_hash: password_hash.clone(),
                name: None,
            })
            .await;

        match insert {
            Ok(user) => break user,
            Err(err) if is_violation_of(&err, constraints::USERS_REFERRAL_CODE) => {
                if attempt >= MAX_CODE_ATTEMPTS {
                    return Err(AppError::Conflict(
                        "Could not allocate a unique referral code".to_string(),
                    ));
                }
                log::warn!("Referral code collision on attempt {}, retrying", attempt);
                attempt += 1;
            }
            Err(err) if is_violation_of(&err, constraints::USERS_EMAIL) => {
                let user_id = store
                    .get_user_by_email(&email)
                    .await
                    .ok()
                    .flatten()
                    .map(|user| user.id);
                return Err(AppError::DuplicateEmail { user_id });
            }
            Err(err) => return Err(err),
        }
    };
    log::info!("User {} registered", user.id);

    let referral_id = match inviter {
        Some(inviter) => match link_referral(store, &inviter, &user).await {
            Ok(referral) => Some(referral.id),
            Err(err) => {
                log::error!(
                    "Failed to record referral from {} to {}: {}",
                    inviter.id,
                    user.id,
                    err
                );
                None
            }
        },
        None => None,
    };

    Ok(Registration { user, referral_id })
}

/// Accepts the inviter's pending invite to this email, if there is one, and
/// credits the signup to the inviter.
async fn link_referral(store: &dyn Store, inviter: &User, signup: &User) -> Res<Referral> {
    let invite_id = match find_pending_invite(store, inviter.id, &signup.email).await? {
        Some(invite) => Some(accept_invite(store, invite.id).await?.id),
        None => None,
    };
    create_referral(store, inviter.id, signup.id, invite_id).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api_invites::services::invite::create_invite;
    use common::error::DependencyKind;
    use db::{MemoryStore, models::invite::InviteStatus, testing::StalePrechecks};

    use super::*;

    async fn signup(store: &dyn Store, email: &str, code: Option<&str>) -> Res<Registration> {
        register_user(store, Some(email), Some("secret1"), code).await
    }

    #[tokio::test]
    async fn issues_a_six_char_uppercase_code() {
        let store = MemoryStore::new();
        let registration = signup(&store, "a@x.com", None).await.unwrap();

        let code = &registration.user.referral_code;
        assert_eq!(code.len(), 6);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
        assert!(registration.referral_id.is_none());
        assert_ne!(registration.user.password_hash, "secret1");
    }

    #[tokio::test]
    async fn emails_are_unique_case_insensitively() {
        let store = MemoryStore::new();
        let first = signup(&store, "Test@X.com", None).await.unwrap();
        assert_eq!(first.user.email, "test@x.com");

        let err = signup(&store, "test@x.com", None).await.unwrap_err();

        match err {
            AppError::DuplicateEmail { user_id } => assert_eq!(user_id, Some(first.user.id)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count_rows().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn racing_email_insert_is_a_duplicate() {
        let inner = Arc::new(MemoryStore::new());
        signup(inner.as_ref(), "a@x.com", None).await.unwrap();

        let stale = StalePrechecks::new(inner.clone());
        let err = signup(&stale, "a@x.com", None).await.unwrap_err();

        assert!(matches!(err, AppError::DuplicateEmail { .. }));
        assert_eq!(inner.count_rows().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn rejects_invalid_input_before_writing() {
        let store = MemoryStore::new();

        let missing = register_user(&store, None, Some("secret1"), None).await;
        let blank = register_user(&store, Some("   "), Some("secret1"), None).await;
        let malformed = register_user(&store, Some("not-an-email"), Some("secret1"), None).await;
        let short = register_user(&store, Some("a@x.com"), Some("12345"), None).await;
        let no_password = register_user(&store, Some("a@x.com"), None, None).await;

        for result in [missing, blank, malformed, short, no_password] {
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
        assert_eq!(store.count_rows().await.unwrap().users, 0);
    }

    #[tokio::test]
    async fn unknown_referral_code_is_rejected() {
        let store = MemoryStore::new();
        let err = signup(&store, "a@x.com", Some("NOPE00")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReferralCode));
        assert_eq!(store.count_rows().await.unwrap().users, 0);
    }

    #[tokio::test]
    async fn self_referral_creates_no_account() {
        let inner = Arc::new(MemoryStore::new());
        let a = signup(inner.as_ref(), "a@x.com", None).await.unwrap().user;

        // a stale email pre-check lets the request reach code resolution
        let stale = StalePrechecks::new(inner.clone());
        let err = signup(&stale, "A@x.com", Some(a.referral_code.as_str()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SelfReferral));
        assert_eq!(inner.count_rows().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn referral_code_is_case_insensitive() {
        let store = MemoryStore::new();
        let a = signup(&store, "a@x.com", None).await.unwrap().user;

        let b = signup(&store, "b@x.com", Some(a.referral_code.to_lowercase().as_str()))
            .await
            .unwrap();

        let referral_id = b.referral_id.unwrap();
        let referral = store
            .get_referral_by_signup_user(b.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(referral.id, referral_id);
        assert_eq!(referral.inviter_id, a.id);
        assert_eq!(referral.invite_id, None);
    }

    #[tokio::test]
    async fn blank_referral_code_is_ignored() {
        let store = MemoryStore::new();
        let registration = signup(&store, "a@x.com", Some("  ")).await.unwrap();
        assert!(registration.referral_id.is_none());
    }

    #[tokio::test]
    async fn invited_signup_accepts_the_invite_and_links_it() {
        let store = MemoryStore::new();
        let a = signup(&store, "a@x.com", None).await.unwrap().user;
        let invite = create_invite(&store, a.id, "b@x.com").await.unwrap();

        let b = signup(&store, "B@x.com", Some(a.referral_code.as_str()))
            .await
            .unwrap();

        let accepted = store.get_invite_by_id(invite.id).await.unwrap().unwrap();
        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert!(accepted.accepted_at.is_some());

        let referrals = store.get_referrals_by_inviter(a.id).await.unwrap();
        assert_eq!(referrals.len(), 1);
        assert_eq!(Some(referrals[0].id), b.referral_id);
        assert_eq!(referrals[0].signup_user_id, b.user.id);
        assert_eq!(referrals[0].invite_id, Some(invite.id));
    }

    #[tokio::test]
    async fn referral_failure_does_not_fail_the_signup() {
        let store = MemoryStore::new();
        let a = signup(&store, "a@x.com", None).await.unwrap().user;
        store.fail_operation("insert_referral", DependencyKind::Unreachable);

        let b = signup(&store, "b@x.com", Some(a.referral_code.as_str()))
            .await
            .unwrap();

        assert!(b.referral_id.is_none());
        assert!(find_by_email(&store, "B@X.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn retries_on_referral_code_collision() {
        let store = MemoryStore::new();
        register_user_with(&store, Some("a@x.com"), Some("secret1"), None, || {
            "AAAAAA".to_string()
        })
        .await
        .unwrap();

        let mut codes = vec!["AAAAAA", "AAAAAA", "BBBBBB"].into_iter();
        let b = register_user_with(&store, Some("b@x.com"), Some("secret1"), None, || {
            codes.next().unwrap_or("CCCCCC").to_string()
        })
        .await
        .unwrap();

        assert_eq!(b.user.referral_code, "BBBBBB");
    }

    #[tokio::test]
    async fn gives_up_after_bounded_code_collisions() {
        let store = MemoryStore::new();
        register_user_with(&store, Some("a@x.com"), Some("secret1"), None, || {
            "AAAAAA".to_string()
        })
        .await
        .unwrap();

        let err = register_user_with(&store, Some("b@x.com"), Some("secret1"), None, || {
            "AAAAAA".to_string()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.count_rows().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn finds_users_by_normalised_email() {
        let store = MemoryStore::new();
        let a = signup(&store, "a@x.com", None).await.unwrap().user;

        let found = find_by_email(&store, "  A@X.COM ").await.unwrap().unwrap();
        assert_eq!(found.id, a.id);
        assert!(find_by_email(&store, "b@x.com").await.unwrap().is_none());
    }
}
