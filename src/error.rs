use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

/// Startup configuration problems. Never produced while serving requests.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {detail}")]
    Invalid { key: &'static str, detail: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("username and password must not be empty")]
    EmptyCredential,
    #[error("password must be at most 72 bytes")]
    PasswordTooLong,
    /// Unknown user or wrong password; the two are deliberately not distinguished.
    #[error("could not validate user")]
    AuthFailure,
    /// Token is outside its validity window.
    #[error("token expired")]
    ExpiredToken,
    /// Signature did not verify, or the token was malformed.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Errors rendered to HTTP clients as `{"detail": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(cause) = self {
            tracing::error!(error = %cause, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.detail() }))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => ApiError::Conflict("Username already registered"),
            StoreError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::EmptyCredential | AuthError::PasswordTooLong => {
                ApiError::BadRequest(e.to_string())
            }
            AuthError::AuthFailure => ApiError::Unauthorized("Could not validate user"),
            AuthError::ExpiredToken | AuthError::InvalidSignature => {
                ApiError::Unauthorized("Could not validate credentials")
            }
            AuthError::Storage(inner) => inner.into(),
            AuthError::Hashing(_) | AuthError::Signing(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_share_one_response() {
        let expired = ApiError::from(AuthError::ExpiredToken);
        let forged = ApiError::from(AuthError::InvalidSignature);
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.to_string(), forged.to_string());
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::from(StoreError::Backend("disk on fire".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), "Internal server error");
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let err = ApiError::from(AuthError::Storage(StoreError::DuplicateUsername));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
