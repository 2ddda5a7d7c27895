//! Sessions: login, registration, token refresh and access-token resolution.
//!
//! Every user has at most one live refresh token. Login, registration and
//! refresh all overwrite it, so a refresh token stops working as soon as a
//! newer one has been issued. There is no logout; a refresh token stays valid
//! until it is superseded or its `exp` passes.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::JwtManager;
use crate::error::{AppError, AppResult};
use crate::models::{Id, RefreshToken, Role, TokenPair, User, UserCreate};
use crate::repositories::{TokenRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct AuthService {
    password_salt: String,
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn TokenRepository>,
    jwt: Arc<dyn JwtManager>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn TokenRepository>,
        jwt: Arc<dyn JwtManager>,
        password_salt: String,
    ) -> Self {
        Self {
            password_salt,
            user_repo,
            token_repo,
            jwt,
        }
    }

    /// Missing users and wrong passwords fail identically.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = match self.user_repo.get_by_username(username).await {
            Ok(user) => user,
            Err(AppError::NotFound) => return Err(AppError::InvalidLoginOrPassword),
            Err(e) => return Err(AppError::service("AuthService.login: get user", e)),
        };

        if !verify_password(password, &user.password_hash, &self.password_salt) {
            debug!(user_id = user.id, "password mismatch");
            return Err(AppError::InvalidLoginOrPassword);
        }

        let pair = self
            .issue_session(user.id)
            .await
            .map_err(|e| AppError::service("AuthService.login", e))?;
        info!(user_id = user.id, "user logged in");
        Ok(pair)
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let password_hash = hash_password(password, &self.password_salt)
            .map_err(|e| AppError::service("AuthService.register: hashing password", e))?;

        let user_id = match self
            .user_repo
            .create(UserCreate {
                username: username.to_string(),
                password_hash,
                role: Role::Student,
                created_at: Utc::now(),
            })
            .await
        {
            Ok(id) => id,
            Err(AppError::AlreadyExists) => return Err(AppError::UsernameAlreadyTaken),
            Err(e) => return Err(AppError::service("AuthService.register: create user", e)),
        };

        let pair = self
            .issue_session(user_id)
            .await
            .map_err(|e| AppError::service("AuthService.register", e))?;
        info!(user_id, "user registered");
        Ok(pair)
    }

    /// Only the most recently issued refresh token of a user is accepted.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let user_id = self
            .jwt
            .parse_refresh_token(refresh_token)
            .map_err(|_| AppError::InvalidRefreshToken)?;

        let stored = match self.token_repo.get_by_user_id(user_id).await {
            Ok(stored) => stored,
            Err(AppError::NotFound) => return Err(AppError::UserNotFound),
            Err(e) => return Err(AppError::service("AuthService.refresh_token: get token", e)),
        };

        if stored.refresh_token != refresh_token {
            debug!(user_id, "superseded refresh token presented");
            return Err(AppError::InvalidRefreshToken);
        }

        let pair = self
            .issue_session(user_id)
            .await
            .map_err(|e| AppError::service("AuthService.refresh_token", e))?;
        debug!(user_id, "token pair refreshed");
        Ok(pair)
    }

    pub async fn get_user_from_access_token(&self, access_token: &str) -> AppResult<User> {
        let user_id = self
            .jwt
            .parse_access_token(access_token)
            .map_err(|_| AppError::InvalidAccessToken)?;
        self.user_repo
            .get_by_id(user_id)
            .await
            .map_err(|_| AppError::UserNotFound)
    }

    /// Mint a pair and make its refresh token the user's only valid one.
    async fn issue_session(&self, user_id: Id) -> AppResult<TokenPair> {
        let pair = self.generate_token_pair(user_id)?;
        self.token_repo
            .create_or_update(RefreshToken {
                user_id,
                refresh_token: pair.refresh_token.clone(),
                updated_at: Utc::now(),
            })
            .await
            .map_err(|e| AppError::service("create or update token", e))?;
        Ok(pair)
    }

    fn generate_token_pair(&self, user_id: Id) -> AppResult<TokenPair> {
        let access_token = self
            .jwt
            .generate_access_token(user_id)
            .map_err(|e| AppError::service("generate_token_pair.generate_access_token", e))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(user_id)
            .map_err(|e| AppError::service("generate_token_pair.generate_refresh_token", e))?;
        Ok(TokenPair::new(access_token, refresh_token))
    }
}
