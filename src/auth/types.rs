// Token types

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// A cached OAuth2 access token.
///
/// `expires_at` is always recomputed from the local clock at receipt time, so
/// the cache's notion of validity stays consistent even when server and client
/// clocks differ.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Build a token stamped at `created_at`, deriving the expiry instant.
    pub fn new(access_token: String, expires_in: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            created_at,
            expires_in,
            expires_at: created_at + Duration::seconds(expires_in),
        }
    }

    /// Whether the token is still usable at `now`.
    ///
    /// The expiry instant itself counts as expired: a token obtained at T with
    /// `expires_in` of 3600 is valid on `[T, T+3600)`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Wire shape of the token endpoint response.
///
/// Extra members (`scope`, `token_type`, ...) are ignored.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
