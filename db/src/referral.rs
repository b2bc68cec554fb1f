use chrono::NaiveDateTime;
use common::error::Res;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::referral::ReferralCreateRequest,
    error::from_sqlx,
    models::{
        invite::InviteStatus,
        referral::{LinkedInvite, Referral, ReferralListItem, ReferredUser},
    },
};

#[derive(sqlx::FromRow)]
struct ReferralListRow {
    id: Uuid,
    created_at: NaiveDateTime,
    signup_user_id: Uuid,
    signup_email: String,
    signup_name: Option<String>,
    signup_created_at: NaiveDateTime,
    invite_id: Option<Uuid>,
    invite_email: Option<String>,
    invite_status: Option<InviteStatus>,
}

impl From<ReferralListRow> for ReferralListItem {
    fn from(row: ReferralListRow) -> Self {
        let invite = match (row.invite_id, row.invite_email, row.invite_status) {
            (Some(id), Some(email), Some(status)) => Some(LinkedInvite { id, email, status }),
            _ => None,
        };
        ReferralListItem {
            id: row.id,
            created_at: row.created_at,
            signup_user: ReferredUser {
                id: row.signup_user_id,
                email: row.signup_email,
                name: row.signup_name,
                created_at: row.signup_created_at,
            },
            invite,
        }
    }
}

pub async fn get_referral_by_signup_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    signup_user_id: Uuid,
) -> Res<Option<Referral>> {
    sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE signup_user_id = $1")
        .bind(signup_user_id)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn get_referrals_by_inviter<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    inviter_id: Uuid,
) -> Res<Vec<Referral>> {
    sqlx::query_as::<_, Referral>(
        "SELECT * FROM referrals WHERE inviter_id = $1 ORDER BY created_at DESC",
    )
    .bind(inviter_id)
    .fetch_all(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn get_referral_list_by_inviter<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    inviter_id: Uuid,
) -> Res<Vec<ReferralListItem>> {
    let rows = sqlx::query_as::<_, ReferralListRow>(
        r#"
        SELECT r.id, r.created_at,
               u.id AS signup_user_id, u.email AS signup_email,
               u.name AS signup_name, u.created_at AS signup_created_at,
               i.id AS invite_id, i.email AS invite_email, i.status AS invite_status
        FROM referrals r
        JOIN users u ON u.id = r.signup_user_id
        LEFT JOIN invites i ON i.id = r.invite_id
        WHERE r.inviter_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(inviter_id)
    .fetch_all(executor)
    .await
    .map_err(from_sqlx)?;

    Ok(rows.into_iter().map(ReferralListItem::from).collect())
}

pub async fn insert_referral<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ReferralCreateRequest,
) -> Res<Referral> {
    sqlx::query_as::<_, Referral>(
        r#"
        INSERT INTO referrals (inviter_id, signup_user_id, invite_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(data.inviter_id)
    .bind(data.signup_user_id)
    .bind(data.invite_id)
    .fetch_one(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn count_referrals<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM referrals")
        .fetch_one(executor)
        .await
        .map_err(from_sqlx)
}
