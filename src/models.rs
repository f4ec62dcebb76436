use serde::{Deserialize, Serialize};

/// Persisted user identity. The hash is never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// OAuth2 password-grant form. Extra fields (grant_type, scope, ...) are ignored.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder
    pub sub: String,
    /// Identity record id
    #[serde(rename = "id")]
    pub identity_id: i64,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkout {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
