use std::sync::Arc;

use crate::authenticator::Authenticator;
use crate::auth::TokenService;
use crate::config::AuthConfig;
use crate::db::{CredentialStore, MemoryUserStore, MemoryWorkoutStore, WorkoutStore};
use crate::error::AuthError;

/// Shared per-process dependencies handed to handlers through `web::Data`.
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub workouts: Arc<dyn WorkoutStore>,
    pub authenticator: Authenticator,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn CredentialStore>,
        workouts: Arc<dyn WorkoutStore>,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            users,
            workouts,
            authenticator: Authenticator::new(config.bcrypt_cost)?,
            tokens: TokenService::new(config),
        })
    }

    pub fn in_memory(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryWorkoutStore::new()),
        )
    }
}
