//! Resolves the product and user references stored inside carts and orders.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        Cart, CartResponse, LineItem, Order, OrderResponse, Populated, ProductSummary,
        UserSummary, resolve_line_items,
    },
    queries::{product_queries, user_queries},
};

struct References {
    products: HashMap<Uuid, ProductSummary>,
    users: HashMap<Uuid, UserSummary>,
}

async fn load_references<'a>(
    pool: &PgPool,
    items: impl Iterator<Item = &'a LineItem>,
    extra_users: &[Uuid],
) -> Result<References> {
    let mut product_ids = Vec::new();
    let mut user_ids = extra_users.to_vec();

    for item in items {
        product_ids.push(item.product);
        user_ids.push(item.product_owner);
    }

    product_ids.sort_unstable();
    product_ids.dedup();
    user_ids.sort_unstable();
    user_ids.dedup();

    Ok(References {
        products: product_queries::find_summaries_by_ids(pool, &product_ids).await?,
        users: user_queries::find_summaries_by_ids(pool, &user_ids).await?,
    })
}

pub async fn resolve_cart(pool: &PgPool, cart: Cart) -> Result<CartResponse> {
    let refs = load_references(pool, cart.items.iter(), &[]).await?;
    let items = resolve_line_items(&cart.items, &refs.products, &refs.users);

    Ok(CartResponse::new(cart, items))
}

pub async fn resolve_orders(pool: &PgPool, orders: Vec<Order>) -> Result<Vec<OrderResponse>> {
    let buyers: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    let refs = load_references(pool, orders.iter().flat_map(|o| o.items.iter()), &buyers).await?;

    let response = orders
        .into_iter()
        .map(|order| {
            let items = resolve_line_items(&order.items, &refs.products, &refs.users);
            let user = Populated::lookup(order.user_id, &refs.users);
            OrderResponse::new(order, user, items)
        })
        .collect();

    Ok(response)
}

pub async fn resolve_order(pool: &PgPool, order: Order) -> Result<OrderResponse> {
    let mut resolved = resolve_orders(pool, vec![order]).await?;

    resolved
        .pop()
        .ok_or_else(|| crate::error::AppError::InternalError("Order resolution failed".to_string()))
}
