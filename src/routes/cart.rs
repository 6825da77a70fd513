use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AddItemRequest, ApiResponse, CartResponse, PromoRequest, UpdateQuantityRequest,
        validate_line_quantity,
    },
    queries::{cart_queries, populate_queries, product_queries},
    utils::extractors::{AppJson, AppPath},
};

pub async fn get_cart(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CartResponse>>> {
    let cart = cart_queries::get_or_create(&state.db, user_id).await?;
    let cart = populate_queries::resolve_cart(&state.db, cart).await?;

    Ok(Json(ApiResponse::data(cart)))
}

pub async fn add_item(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddItemRequest>,
) -> Result<Json<ApiResponse<CartResponse>>> {
    validate_line_quantity(payload.quantity)?;

    let mut tx = state.db.begin().await?;

    let product = product_queries::find_by_id(&mut *tx, payload.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let mut cart = cart_queries::lock_or_create(&mut tx, user_id).await?;
    cart.add_item(user_id, &product, payload.quantity)?;

    let cart = cart_queries::save(&mut tx, &cart).await?;
    tx.commit().await?;

    let cart = populate_queries::resolve_cart(&state.db, cart).await?;

    Ok(Json(ApiResponse::with_message("Product added to cart", cart)))
}

pub async fn update_item(
    State(state): State<AppState>,
    AppPath((user_id, product_id)): AppPath<(Uuid, Uuid)>,
    AppJson(payload): AppJson<UpdateQuantityRequest>,
) -> Result<Json<ApiResponse<CartResponse>>> {
    validate_line_quantity(payload.quantity)?;

    let mut tx = state.db.begin().await?;

    let mut cart = cart_queries::lock_by_user(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    if cart.line(product_id).is_none() {
        return Err(AppError::NotFound("Product not found in cart".to_string()));
    }

    let product = product_queries::find_by_id(&mut *tx, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    cart.set_quantity(&product, payload.quantity)?;

    let cart = cart_queries::save(&mut tx, &cart).await?;
    tx.commit().await?;

    let cart = populate_queries::resolve_cart(&state.db, cart).await?;

    Ok(Json(ApiResponse::with_message("Quantity updated", cart)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    AppPath((user_id, product_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<CartResponse>>> {
    let mut tx = state.db.begin().await?;

    let mut cart = cart_queries::lock_by_user(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    let cart = if cart.remove_item(product_id) {
        cart_queries::save(&mut tx, &cart).await?
    } else {
        cart
    };
    tx.commit().await?;

    let cart = populate_queries::resolve_cart(&state.db, cart).await?;

    Ok(Json(ApiResponse::with_message("Product removed from cart", cart)))
}

pub async fn apply_promo(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    payload: Option<AppJson<PromoRequest>>,
) -> Result<Json<ApiResponse<CartResponse>>> {
    let promo_code = payload.and_then(|AppJson(body)| body.promo_code);

    let mut tx = state.db.begin().await?;

    let mut cart = cart_queries::lock_by_user(&mut tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart not found".to_string()))?;

    let applied = cart.apply_promo(promo_code.as_deref());

    let cart = cart_queries::save(&mut tx, &cart).await?;
    tx.commit().await?;

    let cart = populate_queries::resolve_cart(&state.db, cart).await?;

    let message = if applied {
        "Promo code applied"
    } else {
        "Promo code removed"
    };

    Ok(Json(ApiResponse::with_message(message, cart)))
}
