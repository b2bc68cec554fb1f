use common::error::Res;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::user::UserCreateRequest, error::from_sqlx, models::user::User};

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn get_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn get_user_by_referral_code<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    referral_code: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = $1")
        .bind(referral_code)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserCreateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, referral_code, password_hash, name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.referral_code)
    .bind(data.password_hash)
    .bind(data.name)
    .fetch_one(executor)
    .await
    .map_err(from_sqlx)
}

pub async fn update_password_hash<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    password_hash: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("UPDATE users SET password_hash = $2 WHERE id = $1 RETURNING *")
        .bind(user_id)
        .bind(password_hash)
        .fetch_optional(executor)
        .await
        .map_err(from_sqlx)
}

pub async fn count_users<'e, E: Executor<'e, Database = Postgres>>(executor: E) -> Res<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await
        .map_err(from_sqlx)
}
