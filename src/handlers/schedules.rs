//! Schedule HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::auth::CurrentUser;
use crate::models::{ClassView, Id, Schedule};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
}

/// POST /schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    let schedule = state
        .schedule_service()
        .create(user.id, &body.title)
        .await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /schedules — schedules of the calling user.
pub async fn list_schedules(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Schedule>>, AppError> {
    Ok(Json(state.schedule_service().list_for_user(user.id).await?))
}

/// GET /schedules/:id
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Schedule>, AppError> {
    Ok(Json(state.schedule_service().get_by_id(id).await?))
}

/// GET /schedules/:id/classes
pub async fn list_classes(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<ClassView>>, AppError> {
    Ok(Json(state.class_service().get_all(id).await?))
}
