//! Shared HTTP state and the health probe.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::services::{AuthService, ClassService, ScheduleService};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub schedule_service: ScheduleService,
    pub class_service: ClassService,
}

impl AppState {
    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }
    pub fn schedule_service(&self) -> &ScheduleService {
        &self.schedule_service
    }
    pub fn class_service(&self) -> &ClassService {
        &self.class_service
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "uni-schedule" })),
    )
}
