use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        CreateProductRequest, Product, ProductFilter, ProductRow, ProductSummary,
        UpdateProductRequest,
    },
};

const RESOLVED_SELECT: &str = "SELECT p.*, c.title AS category_title, \
     u.first_name AS owner_first_name, u.last_name AS owner_last_name \
     FROM products p \
     LEFT JOIN categories c ON c.id = p.category_id \
     LEFT JOIN users u ON u.id = p.user_id";

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Product>>
where
    E: PgExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

pub async fn find_resolved_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ProductRow>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(RESOLVED_SELECT);
    query.push(" WHERE p.id = ");
    query.push_bind(id);

    let product = query
        .build_query_as::<ProductRow>()
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<ProductRow>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(RESOLVED_SELECT);
    query.push(" WHERE 1=1");

    if let Some(active) = filter.active {
        query.push(" AND p.is_active = ");
        query.push_bind(active);
    }

    if let Some(category) = filter.category {
        query.push(" AND p.category_id = ");
        query.push_bind(category);
    }

    if let Some(owner) = filter.owner {
        query.push(" AND p.user_id = ");
        query.push_bind(owner);
    }

    query.push(" ORDER BY p.created_at DESC");

    let products = query.build_query_as::<ProductRow>().fetch_all(pool).await?;

    Ok(products)
}

pub async fn find_summaries_by_ids<'e, E>(
    executor: E,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, ProductSummary>>
where
    E: PgExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let products = sqlx::query_as::<_, ProductSummary>(
        "SELECT id, title, description, price, image, quantity FROM products WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn create_product(pool: &PgPool, req: &CreateProductRequest) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            id, title, description, price, quantity,
            image, category_id, user_id, user_full_name
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.price)
    .bind(req.quantity)
    .bind(&req.image)
    .bind(req.category_id)
    .bind(req.user_id)
    .bind(&req.user_full_name)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProductRequest,
) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            price = COALESCE($3, price),
            quantity = COALESCE($4, quantity),
            image = COALESCE($5, image),
            category_id = COALESCE($6, category_id),
            user_full_name = COALESCE($7, user_full_name),
            is_active = COALESCE($8, is_active),
            updated_at = NOW()
        WHERE id = $9
        RETURNING *
        "#,
    )
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.description)
    .bind(req.price)
    .bind(req.quantity)
    .bind(&req.image)
    .bind(req.category_id)
    .bind(&req.user_full_name)
    .bind(req.is_active)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(product)
}

/// Takes `quantity` units out of stock only if that many are available.
/// Returns the remaining stock, or `None` when the product is missing or
/// short. The updated row stays locked until the transaction ends.
pub async fn reserve_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<Option<i32>> {
    let remaining = sqlx::query_scalar::<_, i32>(
        "UPDATE products
         SET quantity = quantity - $1, updated_at = NOW()
         WHERE id = $2 AND quantity >= $1
         RETURNING quantity",
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(remaining)
}
