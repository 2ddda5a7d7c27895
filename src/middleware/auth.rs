//! Bearer-token extractor resolving the calling user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::User;

/// Extractor: the user owning the `Authorization: Bearer <access token>` header.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!(error = %e, "missing or malformed Authorization header");
                    AppError::InvalidAccessToken
                })?;
        let user = state
            .auth_service()
            .get_user_from_access_token(bearer.token())
            .await?;
        Ok(CurrentUser(user))
    }
}
