use sqlx::{PgConnection, PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{GeoPoint, LineItem, NewOrder, Order, OrderStatus, Product},
    queries::{cart_queries, product_queries},
};

async fn insert_order(conn: &mut PgConnection, order: &NewOrder) -> Result<Order> {
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, user_id, items, promo_code, discount, subtotal, total, location)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(order.user_id)
    .bind(Json(&order.items))
    .bind(&order.promo_code)
    .bind(order.discount)
    .bind(order.subtotal)
    .bind(order.total)
    .bind(Json(&order.location))
    .fetch_one(conn)
    .await?;

    Ok(order)
}

/// Turns the user's cart into an order in a single transaction: every line's
/// stock is taken with a conditional decrement, the order is written and the
/// cart is emptied. Any failure rolls the whole checkout back.
pub async fn create_from_cart(pool: &PgPool, user_id: Uuid, location: GeoPoint) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let mut cart = match cart_queries::lock_by_user(&mut tx, user_id).await? {
        Some(cart) if !cart.is_empty() => cart,
        _ => return Err(AppError::InvalidOperation("Cart is empty".to_string())),
    };

    // Fixed lock order so concurrent checkouts sharing products cannot deadlock.
    let mut lock_order: Vec<usize> = (0..cart.items.len()).collect();
    lock_order.sort_by_key(|&i| cart.items[i].product);

    let mut short_lines = Vec::new();
    for i in lock_order {
        let line = &cart.items[i];
        if product_queries::reserve_stock(&mut tx, line.product, line.quantity)
            .await?
            .is_none()
        {
            short_lines.push(i);
        }
    }

    // Report the earliest short line in cart order.
    if let Some(first) = short_lines.into_iter().min() {
        let line = cart.items[first].clone();
        let product = product_queries::find_by_id(&mut *tx, line.product).await?;
        tx.rollback().await?;

        return Err(shortage_error(user_id, &line, product));
    }

    let order = insert_order(&mut tx, &NewOrder::from_cart(&cart, location)).await?;

    cart.clear();
    cart_queries::save(&mut tx, &cart).await?;

    tx.commit().await?;

    tracing::info!(
        "Order {} created for user {} ({} lines, total {})",
        order.id,
        user_id,
        order.items.len(),
        order.total
    );

    Ok(order)
}

fn shortage_error(user_id: Uuid, line: &LineItem, product: Option<Product>) -> AppError {
    let Some(product) = product else {
        return AppError::NotFound(format!("Product {} no longer exists", line.product_name));
    };

    tracing::warn!(
        "Checkout rejected for user {}: {} has {} units, {} requested",
        user_id,
        product.id,
        product.quantity,
        line.quantity
    );

    AppError::InsufficientStock {
        product: product.title,
        remaining: product.quantity,
    }
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(order)
}

pub async fn get_user_orders(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn get_all(pool: &PgPool) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;

    Ok(orders)
}

/// Moves an order from `from` to `to`. Returns `None` if the order is no
/// longer in `from`.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $1, updated_at = NOW()
         WHERE id = $2 AND status = $3
         RETURNING *",
    )
    .bind(to)
    .bind(id)
    .bind(from)
    .fetch_optional(pool)
    .await?;

    Ok(order)
}
