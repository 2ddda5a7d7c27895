//! Application error types shared by repositories, services and handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application-level errors.
///
/// Repositories report `NotFound` / `AlreadyExists`; services translate those
/// into the user-facing kinds and wrap anything unexpected in `Service`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("invalid login or password")]
    InvalidLoginOrPassword,

    #[error("username already taken")]
    UsernameAlreadyTaken,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid access token")]
    InvalidAccessToken,

    #[error("user not found")]
    UserNotFound,

    #[error("you don't have permission")]
    DontHavePermission,

    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Discriminant of [`AppError`] for matching without caring about payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidLoginOrPassword,
    UsernameAlreadyTaken,
    InvalidRefreshToken,
    InvalidAccessToken,
    UserNotFound,
    DontHavePermission,
    Config,
    Db,
    Validation,
    Jwt,
    Internal,
}

impl AppError {
    /// Wrap an unexpected lower-layer failure with call-site context.
    pub fn service(context: &'static str, source: AppError) -> Self {
        AppError::Service {
            context,
            source: Box::new(source),
        }
    }

    /// Kind of the innermost error, looking through `Service` wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::AlreadyExists => ErrorKind::AlreadyExists,
            AppError::InvalidLoginOrPassword => ErrorKind::InvalidLoginOrPassword,
            AppError::UsernameAlreadyTaken => ErrorKind::UsernameAlreadyTaken,
            AppError::InvalidRefreshToken => ErrorKind::InvalidRefreshToken,
            AppError::InvalidAccessToken => ErrorKind::InvalidAccessToken,
            AppError::UserNotFound => ErrorKind::UserNotFound,
            AppError::DontHavePermission => ErrorKind::DontHavePermission,
            AppError::Service { source, .. } => source.kind(),
            AppError::Config(_) => ErrorKind::Config,
            AppError::Db(_) => ErrorKind::Db,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Jwt(_) => ErrorKind::Jwt,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound | AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::AlreadyExists | AppError::UsernameAlreadyTaken => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::InvalidLoginOrPassword
            | AppError::InvalidRefreshToken
            | AppError::InvalidAccessToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Jwt(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::DontHavePermission => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Service { .. }
            | AppError::Config(_)
            | AppError::Db(_)
            | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
