//! Refresh token records and the token pair handed to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;

/// The single active refresh token of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshToken {
    pub user_id: Id,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}
