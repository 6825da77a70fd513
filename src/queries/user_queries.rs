use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{GeoPoint, LoginHistory, UpdateProfileRequest, User, UserStats, UserSummary},
};

const LOGIN_HISTORY_LIMIT: i64 = 10;

pub async fn create_user(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, first_name, last_name, email, password, is_face_verified)
         VALUES ($1, $2, $3, $4, $5, TRUE)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_summaries_by_ids<'e, E>(
    executor: E,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserSummary>>
where
    E: PgExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, first_name, last_name, email FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProfileRequest,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email),
            profile_image = COALESCE($4, profile_image),
            updated_at = NOW()
         WHERE id = $5
         RETURNING *",
    )
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.profile_image)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Counts the active products and categories owned by a user.
pub async fn owned_counts(pool: &PgPool, id: Uuid) -> Result<UserStats> {
    let (products, categories) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT
            (SELECT COUNT(*) FROM products WHERE user_id = $1 AND is_active),
            (SELECT COUNT(*) FROM categories WHERE user_id = $1 AND is_active)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(UserStats {
        products,
        categories,
    })
}

pub async fn add_login_history(
    pool: &PgPool,
    user_id: Uuid,
    device: &str,
    ip_address: &str,
    location: &GeoPoint,
) -> Result<LoginHistory> {
    let entry = sqlx::query_as::<_, LoginHistory>(
        "INSERT INTO login_history (id, user_id, device, ip_address, location)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(device)
    .bind(ip_address)
    .bind(sqlx::types::Json(location))
    .fetch_one(pool)
    .await?;

    Ok(entry)
}

pub async fn recent_login_history(pool: &PgPool, user_id: Uuid) -> Result<Vec<LoginHistory>> {
    let history = sqlx::query_as::<_, LoginHistory>(
        "SELECT * FROM login_history
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2",
    )
    .bind(user_id)
    .bind(LOGIN_HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(history)
}
