//! University schedule backend.
//!
//! Schedules and their classes behind a JSON API, with JWT access/refresh
//! sessions. Each user holds exactly one valid refresh token at a time.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};
pub use handlers::http::AppState;
pub use services::{AuthService, ClassService, ScheduleService};

use axum::routing::{get, post};
use handlers::http;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router (health, auth, schedules, classes). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me));

    let schedule_routes = axum::Router::new()
        .route(
            "/",
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route("/:id", get(handlers::get_schedule))
        .route("/:id/classes", get(handlers::list_classes));

    let class_routes = axum::Router::new()
        .route("/", post(handlers::create_class))
        .route(
            "/:id",
            get(handlers::get_class)
                .patch(handlers::update_class)
                .delete(handlers::delete_class),
        );

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/auth", auth_routes)
        .nest("/schedules", schedule_routes)
        .nest("/classes", class_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
