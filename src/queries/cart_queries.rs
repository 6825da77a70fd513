use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{error::Result, models::Cart};

async fn insert_if_missing(conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
    sqlx::query(
        "INSERT INTO carts (id, user_id) VALUES ($1, $2)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Returns the user's cart, creating an empty one on first access.
pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<Cart> {
    let mut conn = pool.acquire().await?;
    insert_if_missing(&mut conn, user_id).await?;

    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(cart)
}

/// Loads the user's cart and locks it for the rest of the transaction.
pub async fn lock_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(cart)
}

pub async fn lock_or_create(conn: &mut PgConnection, user_id: Uuid) -> Result<Cart> {
    insert_if_missing(&mut *conn, user_id).await?;

    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_one(conn)
        .await?;

    Ok(cart)
}

pub async fn save(conn: &mut PgConnection, cart: &Cart) -> Result<Cart> {
    let cart = sqlx::query_as::<_, Cart>(
        "UPDATE carts
         SET
            items = $1,
            promo_code = $2,
            discount = $3,
            subtotal = $4,
            total = $5,
            updated_at = NOW()
         WHERE id = $6
         RETURNING *",
    )
    .bind(&cart.items)
    .bind(&cart.promo_code)
    .bind(cart.discount)
    .bind(cart.subtotal)
    .bind(cart.total)
    .bind(cart.id)
    .fetch_one(conn)
    .await?;

    Ok(cart)
}
