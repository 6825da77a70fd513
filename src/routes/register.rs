use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{ApiResponse, AuthResponse, RegisterRequest},
    queries::user_queries,
    utils::{extractors::AppJson, jwt},
};

const EMAIL_TAKEN: &str = "A user with this email already exists";
pub(crate) const MIN_PASSWORD_LENGTH: usize = 6;

pub async fn register_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    validate_registration(&payload)?;

    let email = normalize_email(&payload.email);

    if user_queries::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;

    let user = user_queries::create_user(
        &state.db,
        payload.first_name.trim(),
        payload.last_name.trim(),
        &email,
        &password_hash,
    )
    .await
    .map_err(|e| match e {
        AppError::Conflict(_) => AppError::Conflict(EMAIL_TAKEN.to_string()),
        other => other,
    })?;

    let token = jwt::generate_token(user.id, &state.auth.jwt_secret, state.auth.token_ttl_days)?;

    tracing::info!("User {} registered", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User created successfully",
            AuthResponse {
                token,
                user: user.into(),
            },
        )),
    ))
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };

    if !valid {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    validate_email(&payload.email)?;

    if payload.first_name.trim().is_empty() {
        return Err(AppError::ValidationError("First name is required".to_string()));
    }

    if payload.last_name.trim().is_empty() {
        return Err(AppError::ValidationError("Last name is required".to_string()));
    }

    validate_password(&payload.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Kofi".to_string(),
            last_name: "Mensah".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&request("kofi@example.com", "secret1")).is_ok());
        assert!(validate_registration(&request("kofi.example.com", "secret1")).is_err());
        assert!(validate_registration(&request("@example.com", "secret1")).is_err());
        assert!(validate_registration(&request("kofi@example", "secret1")).is_err());
        assert!(validate_registration(&request("kofi@example.com", "123")).is_err());

        let mut req = request("kofi@example.com", "secret1");
        req.first_name = "  ".to_string();
        assert!(matches!(
            validate_registration(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Kofi@Example.COM "), "kofi@example.com");
    }
}
