use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{ApiResponse, Category, CreateCategoryRequest, UpdateCategoryRequest},
    queries::{category_queries, user_queries},
    utils::extractors::{AppJson, AppPath},
};

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    Ok(())
}

pub async fn get_all_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = category_queries::get_active(&state.db).await?;

    Ok(Json(ApiResponse::list(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = category_queries::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(ApiResponse::data(category)))
}

pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    validate_title(&payload.title)?;

    if user_queries::find_by_id(&state.db, payload.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let category = category_queries::create_category(&state.db, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Category created successfully",
            category,
        )),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }

    let category = category_queries::update_category(&state.db, id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        "Category updated successfully",
        category,
    )))
}
