//! Class HTTP handlers. Updates and deletes require owning the schedule.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::CurrentUser;
use crate::models::{Class, CreateClassDto, Id, UpdateClassDto};

/// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(body): Json<CreateClassDto>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    let id = state.class_service().create(body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /classes/:id
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Class>, AppError> {
    Ok(Json(state.class_service().get_by_id(id).await?))
}

/// PATCH /classes/:id
pub async fn update_class(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Id>,
    Json(body): Json<UpdateClassDto>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    state.class_service().update(user.id, id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /classes/:id
pub async fn delete_class(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Id>,
) -> Result<StatusCode, AppError> {
    state.class_service().delete(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
