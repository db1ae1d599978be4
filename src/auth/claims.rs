/// JWT Claims structures
///
/// `Claims` is the payload of an access token. `RefreshClaims` is the
/// reduced payload of a refresh token: expiry only, no identity.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Identity fields a token is issued for (claims without expiry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Stable user identifier
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Build access claims valid for `ttl_seconds` from `now`.
    pub fn new(identity: &Identity, now: i64, ttl_seconds: i64) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: identity.role,
            issued_at: now,
            expires_at: now + ttl_seconds,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// JWT Claims for refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RefreshClaims {
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl RefreshClaims {
    pub fn new(now: i64, ttl_seconds: i64) -> Self {
        Self {
            issued_at: now,
            expires_at: now + ttl_seconds,
        }
    }
}
