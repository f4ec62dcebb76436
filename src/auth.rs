use std::future::{ready, Ready};

use actix_web::dev::{Payload, ServiceRequest};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::AuthConfig;
use crate::error::{ApiError, AuthError};
use crate::models::Claims;
use crate::state::AppState;

/// Mints and checks stateless access tokens.
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        // Expiry is checked against our own clock in `validate_token_at`.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            algorithm: config.algorithm,
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            lifetime: Duration::minutes(config.token_lifetime_minutes),
        }
    }

    pub fn issue_token(&self, username: &str, identity_id: i64) -> Result<String, AuthError> {
        self.issue_token_at(username, identity_id, Utc::now())
    }

    pub fn issue_token_at(
        &self,
        username: &str,
        identity_id: i64,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.to_owned(),
            identity_id,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Accepts the token only if the signature verifies and `iat <= now < exp`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "token rejected");
                AuthError::InvalidSignature
            })?;

        let now = now.timestamp();
        if now < claims.iat || now >= claims.exp {
            tracing::debug!(identity_id = claims.identity_id, "token outside validity window");
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }
}

/// Bearer guard for protected scopes. Stores validated claims in request extensions.
///
/// A missing header is rejected with the same response as a bad token.
pub async fn validator(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let outcome = match (req.app_data::<web::Data<AppState>>(), credentials) {
        (Some(state), Some(credentials)) => state
            .tokens
            .validate_token(credentials.token())
            .map_err(ApiError::from),
        (Some(_), None) => Err(ApiError::from(AuthError::InvalidSignature)),
        (None, _) => Err(ApiError::internal("application state is not registered")),
    };

    match outcome {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(e) => Err((e.into(), req)),
    }
}

/// Claims of the caller, available to handlers behind [`validator`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.identity_id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        ready(claims.map(AuthenticatedUser).ok_or(ApiError::Unauthorized(
            "Could not validate credentials",
        )))
    }
}
