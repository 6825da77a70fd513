use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        ApiResponse, CreateOrderRequest, GeoPoint, OrderResponse, OrderStatus,
        UpdateStatusRequest,
    },
    queries::{order_queries, populate_queries},
    utils::extractors::{AppJson, AppPath},
};

pub async fn create_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>)> {
    let location = GeoPoint::from_input(payload.location)?;

    let order = order_queries::create_from_cart(&state.db, payload.user_id, location).await?;
    let order = populate_queries::resolve_order(&state.db, order).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Order created successfully", order)),
    ))
}

pub async fn get_user_orders(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>> {
    let orders = order_queries::get_user_orders(&state.db, user_id).await?;
    let orders = populate_queries::resolve_orders(&state.db, orders).await?;

    Ok(Json(ApiResponse::list(orders)))
}

pub async fn get_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    let order = order_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let order = populate_queries::resolve_order(&state.db, order).await?;

    Ok(Json(ApiResponse::data(order)))
}

pub async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>> {
    let orders = order_queries::get_all(&state.db).await?;
    let orders = populate_queries::resolve_orders(&state.db, orders).await?;

    Ok(Json(ApiResponse::list(orders)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>> {
    let next: OrderStatus = payload.status.parse()?;

    let order = order_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let current = order.status;

    let order = if current == next {
        order
    } else if current.can_transition_to(next) {
        let updated = order_queries::update_status(&state.db, id, current, next)
            .await?
            .ok_or_else(|| {
                AppError::InvalidOperation("Order status was changed concurrently".to_string())
            })?;

        tracing::info!("Order {} status: {} -> {}", id, current.as_str(), next.as_str());
        updated
    } else {
        return Err(AppError::InvalidOperation(format!(
            "Cannot change order status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    };

    let order = populate_queries::resolve_order(&state.db, order).await?;

    Ok(Json(ApiResponse::with_message("Order status updated", order)))
}
