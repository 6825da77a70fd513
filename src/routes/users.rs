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
        ApiResponse, Category, ChangePasswordRequest, GeoPoint, LoginHistory,
        LoginHistoryRequest, ProductFilter, ProductResponse, UpdateProfileRequest, User,
        UserProfile,
    },
    queries::{category_queries, product_queries, user_queries},
    routes::register::{normalize_email, validate_email, validate_password},
    utils::extractors::{AppJson, AppPath},
};

pub async fn get_profile(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<UserProfile>>> {
    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let stats = user_queries::owned_counts(&state.db, user_id).await?;

    Ok(Json(ApiResponse::data(UserProfile { user, stats })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(mut payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>> {
    if let Some(ref email) = payload.email {
        validate_email(email)?;
        payload.email = Some(normalize_email(email));
    }

    for name in [&payload.first_name, &payload.last_name].into_iter().flatten() {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError("Name cannot be empty".to_string()));
        }
    }

    let user = user_queries::update_profile(&state.db, user_id, &payload)
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => {
                AppError::Conflict("A user with this email already exists".to_string())
            }
            other => other,
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        "Profile updated successfully",
        user,
    )))
}

pub async fn change_password(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let is_valid = bcrypt::verify(&payload.current_password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials(
            "Current password is incorrect".to_string(),
        ));
    }

    validate_password(&payload.new_password)?;

    let password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    user_queries::update_password(&state.db, user_id, &password_hash).await?;

    Ok(Json(ApiResponse::message("Password changed successfully")))
}

pub async fn get_login_history(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<LoginHistory>>>> {
    let history = user_queries::recent_login_history(&state.db, user_id).await?;

    Ok(Json(ApiResponse::list(history)))
}

pub async fn add_login_history(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginHistoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LoginHistory>>)> {
    let location = GeoPoint::from_input(payload.location)?;
    let device = payload.device.unwrap_or_else(|| "Unknown".to_string());
    let ip_address = payload.ip_address.unwrap_or_else(|| "Unknown".to_string());

    if user_queries::find_by_id(&state.db, payload.user_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let entry = user_queries::add_login_history(
        &state.db,
        payload.user_id,
        &device,
        &ip_address,
        &location,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Login history recorded", entry)),
    ))
}

pub async fn get_user_products(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>> {
    let filter = ProductFilter {
        active: Some(true),
        category: None,
        owner: Some(user_id),
    };

    let products = product_queries::list(&state.db, &filter)
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ApiResponse::list(products)))
}

pub async fn get_user_categories(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = category_queries::get_active_by_owner(&state.db, user_id).await?;

    Ok(Json(ApiResponse::list(categories)))
}
