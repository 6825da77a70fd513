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
        ApiResponse, CreateProductRequest, ProductFilter, ProductResponse, UpdateProductRequest,
    },
    queries::{category_queries, product_queries, user_queries},
    utils::extractors::{AppJson, AppPath, AppQuery},
};

async fn list_resolved(state: &AppState, filter: &ProductFilter) -> Result<Vec<ProductResponse>> {
    let products = product_queries::list(&state.db, filter).await?;

    Ok(products.into_iter().map(ProductResponse::from).collect())
}

async fn load_resolved(state: &AppState, id: Uuid) -> Result<ProductResponse> {
    product_queries::find_resolved_by_id(&state.db, id)
        .await?
        .map(ProductResponse::from)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Lists products, active ones unless the caller asks otherwise.
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(mut filter): AppQuery<ProductFilter>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>> {
    filter.active.get_or_insert(true);

    let products = list_resolved(&state, &filter).await?;

    Ok(Json(ApiResponse::list(products)))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>> {
    let filter = ProductFilter {
        active: Some(true),
        category: Some(category_id),
        owner: None,
    };

    let products = list_resolved(&state, &filter).await?;

    Ok(Json(ApiResponse::list(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<ProductResponse>>> {
    let product = load_resolved(&state, id).await?;

    Ok(Json(ApiResponse::data(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    payload.validate()?;

    if category_queries::find_by_id(&state.db, payload.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    if user_queries::find_by_id(&state.db, payload.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let product = product_queries::create_product(&state.db, &payload).await?;
    let product = load_resolved(&state, product.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Product created successfully",
            product,
        )),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductResponse>>> {
    payload.validate()?;

    if let Some(category_id) = payload.category_id {
        if category_queries::find_by_id(&state.db, category_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
    }

    product_queries::update_product(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let product = load_resolved(&state, id).await?;

    Ok(Json(ApiResponse::with_message(
        "Product updated successfully",
        product,
    )))
}
