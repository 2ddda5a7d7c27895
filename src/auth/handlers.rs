//! Auth HTTP handlers: register, login, refresh, me.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::CurrentUser;
use crate::models::{TokenPair, User};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(mut body): Json<RegisterRequest>,
) -> Result<Json<TokenPair>, AppError> {
    body.username = body.username.trim().to_string();
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    let pair = state
        .auth_service()
        .register(&body.username, &body.password)
        .await?;
    Ok(Json(pair))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state
        .auth_service()
        .login(body.username.trim(), &body.password)
        .await?;
    Ok(Json(pair))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state
        .auth_service()
        .refresh_token(&body.refresh_token)
        .await?;
    Ok(Json(pair))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
