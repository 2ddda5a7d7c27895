//! JWT issue and validation for access and refresh tokens.

use crate::error::{AppError, AppResult};
use crate::models::Id;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuing and parsing, keyed by user id.
pub trait JwtManager: Send + Sync {
    fn parse_access_token(&self, token: &str) -> AppResult<Id>;
    fn parse_refresh_token(&self, token: &str) -> AppResult<Id>;
    fn generate_access_token(&self, user_id: Id) -> AppResult<String>;
    fn generate_refresh_token(&self, user_id: Id) -> AppResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
    /// Random per token, so two tokens minted in the same second still differ.
    pub jti: String,
}

#[derive(Clone)]
struct Key {
    secret: String,
    ttl: Duration,
}

/// HS256 tokens; access and refresh tokens use separate secrets and lifetimes.
#[derive(Clone)]
pub struct HmacJwtManager {
    access: Key,
    refresh: Key,
}

impl HmacJwtManager {
    pub fn new(
        access_secret: String,
        refresh_secret: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: Key {
                secret: access_secret,
                ttl: access_ttl,
            },
            refresh: Key {
                secret: refresh_secret,
                ttl: refresh_ttl,
            },
        }
    }

    fn key(&self, token_type: TokenType) -> &Key {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn issue(&self, user_id: Id, token_type: TokenType) -> AppResult<String> {
        let key = self.key(token_type);
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            token_type,
            exp: (now + key.ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(key.secret.as_bytes()),
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        Ok(token)
    }

    fn validate(&self, token: &str, token_type: TokenType) -> AppResult<Id> {
        let key = self.key(token_type);
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(key.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        if data.claims.token_type != token_type {
            return Err(AppError::Jwt("unexpected token type".to_string()));
        }
        let id = data
            .claims
            .sub
            .parse::<Id>()
            .map_err(|e| AppError::Jwt(e.to_string()))?;
        Ok(id)
    }
}

impl JwtManager for HmacJwtManager {
    fn parse_access_token(&self, token: &str) -> AppResult<Id> {
        self.validate(token, TokenType::Access)
    }

    fn parse_refresh_token(&self, token: &str) -> AppResult<Id> {
        self.validate(token, TokenType::Refresh)
    }

    fn generate_access_token(&self, user_id: Id) -> AppResult<String> {
        self.issue(user_id, TokenType::Access)
    }

    fn generate_refresh_token(&self, user_id: Id) -> AppResult<String> {
        self.issue(user_id, TokenType::Refresh)
    }
}
