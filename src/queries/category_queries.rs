use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Category, CreateCategoryRequest, UpdateCategoryRequest},
};

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Category>>
where
    E: PgExecutor<'e>,
{
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(category)
}

pub async fn get_active(pool: &PgPool) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE is_active = TRUE ORDER BY title ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn get_active_by_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories
         WHERE user_id = $1 AND is_active = TRUE
         ORDER BY title ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

pub async fn create_category(pool: &PgPool, req: &CreateCategoryRequest) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, title, user_id)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(req.title.trim())
    .bind(req.user_id)
    .fetch_one(pool)
    .await?;

    Ok(category)
}

pub async fn update_category(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateCategoryRequest,
) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories
         SET
            title = COALESCE($1, title),
            is_active = COALESCE($2, is_active),
            updated_at = NOW()
         WHERE id = $3
         RETURNING *",
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.is_active)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(category)
}
