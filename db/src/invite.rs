use chrono::NaiveDateTime;
use common::error::Res;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::invite::InviteCreateRequest,
    error::from_sqlx,
    models::invite::{Invite, InviteStatus},
};

pub async fn get_invite_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    invite_id: Uuid,
) -> Res<Option<Invite>> {
    sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE id = $1")
        .bind(invite_id)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn get_invite_by_pair<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    inviter_id: Uuid,
    email: &str,
) -> Res<Option<Invite>> {
    sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE inviter_id = $1 AND email = $2")
        .bind(inviter_id)
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn get_pending_invite<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    inviter_id: Uuid,
    email: &str,
) -> Res<Option<Invite>> {
    sqlx::query_as::<_, Invite>(
        "SELECT * FROM invites WHERE inviter_id = $1 AND email = $2 AND status = $3",
    )
    .bind(inviter_id)
    .bind(email)
    .bind(InviteStatus::Sent)
    .fetch_optional(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn get_invites_by_inviter<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    inviter_id: Uuid,
) -> Res<Vec<Invite>> {
    sqlx::query_as::<_, Invite>(
        "SELECT * FROM invites WHERE inviter_id = $1 ORDER BY created_at DESC",
    )
    .bind(inviter_id)
    .fetch_all(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn insert_invite<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: InviteCreateRequest,
) -> Res<Invite> {
    sqlx::query_as::<_, Invite>(
        r#"
        INSERT INTO invites (inviter_id, email, token, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(data.inviter_id)
    .bind(data.email)
    .bind(data.token)
    .bind(InviteStatus::Sent)
    .fetch_one(executor)
    .await
    .map_err(from_sqlx)
}

/// Only a SENT invite transitions; returns `None` when nothing was updated.
pub async fn mark_invite_accepted<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    invite_id: Uuid,
    accepted_at: NaiveDateTime,
) -> Res<Option<Invite>> {
    sqlx::query_as::<_, Invite>(
        "UPDATE invites SET status = $1, accepted_at = $2 WHERE id = $3 AND status = $4 RETURNING *",
    )
    .bind(InviteStatus::Accepted)
    .bind(accepted_at)
    .bind(invite_id)
    .bind(InviteStatus::Sent)
    .fetch_optional(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn count_invites<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM invites")
        .fetch_one(executor)
        .await
        .map_err(from_sqlx)
}
