use axum::{Extension, Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{ApiResponse, AuthResponse, AuthUser, LoginRequest},
    queries::user_queries,
    routes::register::normalize_email,
    utils::{
        extractors::{AppJson, extract_user_id},
        jwt,
        jwt::Claims,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub async fn login_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let user = user_queries::find_by_email(&state.db, &normalize_email(&payload.email))
        .await?
        .ok_or_else(|| AppError::InvalidCredentials(INVALID_CREDENTIALS.to_string()))?;

    let is_valid = bcrypt::verify(&payload.password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::generate_token(user.id, &state.auth.jwt_secret, state.auth.token_ttl_days)?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthResponse {
            token,
            user: user.into(),
        },
    )))
}

pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AuthUser>>> {
    let user_id = extract_user_id(&claims)?;

    let user = user_queries::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(ApiResponse::data(user.into())))
}
