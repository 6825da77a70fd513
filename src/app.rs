use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::{AppConfig, AuthConfig, UploadConfig},
    database,
    error::{AppError, Result},
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: Arc<AuthConfig>,
    pub upload: Arc<UploadConfig>,
}

impl AppState {
    pub fn new(db: PgPool, config: &AppConfig) -> Self {
        Self {
            db,
            auth: Arc::new(config.auth.clone()),
            upload: Arc::new(config.upload.clone()),
        }
    }
}

/// Connects to the database, prepares the upload directory and builds the
/// router. Returns the pool too so the caller can close it on shutdown.
pub async fn build(config: &AppConfig) -> Result<(Router, PgPool)> {
    let pool = database::create_pool(&config.database).await?;

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let state = AppState::new(pool.clone(), config);
    let app = router(state, config)?;

    Ok((app, pool))
}

pub fn router(state: AppState, config: &AppConfig) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]);

    let cors = if config.cors.allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let allowed_origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| {
                    AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        cors.allow_origin(allowed_origins)
    };

    let app = routes::create_router(&state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
