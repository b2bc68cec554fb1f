use api_auth::services::credentials::hash_password;
use chrono::Utc;
use common::{error::Res, ids};
use db::{
    Store,
    dtos::{invite::InviteCreateRequest, referral::ReferralCreateRequest, user::UserCreateRequest},
    models::{invite::Invite, user::User},
};

pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_EMAIL: &str = "demo@referral.app";
pub const DEMO_REFERRAL_CODE: &str = "DEMO01";

/// Inserts the demo accounts, two invites from the demo user (one accepted)
/// and a referral of Alice through the accepted invite. Existing demo users
/// get their password reset to the demo password; other rows are left as
/// they are.
pub async fn seed_demo_data(store: &dyn Store) -> Res<()> {
    let password_hash = hash_password(DEMO_PASSWORD.to_string()).await?;

    let demo = ensure_user(
        store,
        DEMO_EMAIL,
        "Demo User",
        Some(DEMO_REFERRAL_CODE),
        &password_hash,
    )
    .await?;
    let alice = ensure_user(store, "alice@example.com", "Alice Johnson", None, &password_hash).await?;
    ensure_user(store, "bob@example.com", "Bob Smith", None, &password_hash).await?;

    ensure_invite(store, &demo, "invited1@example.com", "seed-invite-token-1").await?;
    let accepted =
        ensure_invite(store, &demo, "invited2@example.com", "seed-invite-token-2").await?;
    if !accepted.is_accepted() {
        store
            .mark_invite_accepted(accepted.id, Utc::now().naive_utc())
            .await?;
    }

    if store.get_referral_by_signup_user(alice.id).await?.is_none() {
        store
            .insert_referral(ReferralCreateRequest {
                inviter_id: demo.id,
                signup_user_id: alice.id,
                invite_id: Some(accepted.id),
            })
            .await?;
    }

    let counts = store.count_rows().await?;
    log::info!(
        "Demo data ready: {} users, {} invites, {} referrals",
        counts.users,
        counts.invites,
        counts.referrals
    );
    Ok(())
}

async fn ensure_user(
    store: &dyn Store,
    email: &str,
    name: &str,
    referral_code: Option<&str>,
    password_hash: &str,
) -> Res<User> {
    if let Some(user) = store.get_user_by_email(email).await? {
        return Ok(store
            .set_password_hash(user.id, password_hash)
            .await?
            .unwrap_or(user));
    }
    store
        .insert_user(UserCreateRequest {
            email: email.to_string(),
            referral_code: referral_code
                .map(str::to_string)
                .unwrap_or_else(ids::new_referral_code),
            password_hash: password_hash.to_string(),
            name: Some(name.to_string()),
        })
        .await
}

async fn ensure_invite(store: &dyn Store, inviter: &User, email: &str, token: &str) -> Res<Invite> {
    if let Some(invite) = store.get_invite_by_pair(inviter.id, email).await? {
        return Ok(invite);
    }
    store
        .insert_invite(InviteCreateRequest {
            inviter_id: inviter.id,
            email: email.to_string(),
            token: token.to_string(),
        })
        .await
}
