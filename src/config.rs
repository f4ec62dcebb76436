use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

const DEFAULT_TOKEN_LIFETIME_MINUTES: i64 = 20;
const MAX_TOKEN_LIFETIME_MINUTES: i64 = 7 * 24 * 60;

/// Signing and hashing settings shared by the token service and authenticator.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: Vec<u8>,
    pub algorithm: Algorithm,
    pub token_lifetime_minutes: i64,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(secret: impl Into<Vec<u8>>, algorithm: Algorithm) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            token_lifetime_minutes: DEFAULT_TOKEN_LIFETIME_MINUTES,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = required(&lookup, "AUTH_SECRET_KEY")?;
        let algorithm_name = required(&lookup, "AUTH_ALGORITHM")?;
        let algorithm = parse_algorithm(&algorithm_name)?;

        let mut config = Self::new(secret.into_bytes(), algorithm);

        if let Some(raw) = lookup("AUTH_TOKEN_LIFETIME_MINUTES") {
            let minutes = raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                key: "AUTH_TOKEN_LIFETIME_MINUTES",
                detail: e.to_string(),
            })?;
            if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&minutes) {
                return Err(ConfigError::Invalid {
                    key: "AUTH_TOKEN_LIFETIME_MINUTES",
                    detail: format!("must be between 1 and {MAX_TOKEN_LIFETIME_MINUTES}"),
                });
            }
            config.token_lifetime_minutes = minutes;
        }

        if let Some(raw) = lookup("AUTH_BCRYPT_COST") {
            let cost = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                key: "AUTH_BCRYPT_COST",
                detail: e.to_string(),
            })?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::Invalid {
                    key: "AUTH_BCRYPT_COST",
                    detail: "must be between 4 and 31".to_string(),
                });
            }
            config.bcrypt_cost = cost;
        }

        Ok(config)
    }
}

/// Whole-process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                detail: e.to_string(),
            })?,
            None => 8000,
        };
        let auth = AuthConfig::from_lookup(lookup)?;
        Ok(Self { host, port, auth })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

// Tokens are signed with a shared secret, so only the HMAC family applies.
fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(name.trim()).map_err(|_| ConfigError::Invalid {
        key: "AUTH_ALGORITHM",
        detail: format!("unknown algorithm {name:?}"),
    })?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::Invalid {
            key: "AUTH_ALGORITHM",
            detail: format!("{other:?} needs a key pair, only HS256/HS384/HS512 are supported"),
        }),
    }
}
