use bcrypt::{non_truncating_hash, non_truncating_verify, BcryptError};

use crate::db::CredentialStore;
use crate::error::AuthError;
use crate::models::IdentityRecord;

// Verified against when the username is unknown, so both failure paths cost
// one bcrypt verification.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NotFound,
    InvalidCredential,
}

impl Rejection {
    fn as_str(self) -> &'static str {
        match self {
            Rejection::NotFound => "not_found",
            Rejection::InvalidCredential => "invalid_credential",
        }
    }
}

/// Registers identities and checks passwords against their stored hashes.
pub struct Authenticator {
    cost: u32,
    decoy_hash: String,
}

impl Authenticator {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        Ok(Self {
            cost,
            decoy_hash: non_truncating_hash(DECOY_PASSWORD, cost)?,
        })
    }

    pub async fn register<S>(
        &self,
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<IdentityRecord, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        // bcrypt only reads the first 72 bytes; longer passwords are refused.
        let password_hash = non_truncating_hash(password, self.cost).map_err(|e| match e {
            BcryptError::Truncation(_) => AuthError::PasswordTooLong,
            other => AuthError::Hashing(other),
        })?;
        let user = store.insert(username, &password_hash).await?;
        tracing::info!(identity_id = user.id, "identity registered");
        Ok(user)
    }

    /// Unknown user and wrong password both yield [`AuthError::AuthFailure`].
    pub async fn authenticate<S>(
        &self,
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<IdentityRecord, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        match self.check(store, username, password).await? {
            Ok(user) => {
                tracing::info!(identity_id = user.id, "login succeeded");
                Ok(user)
            }
            Err(rejection) => {
                tracing::warn!(reason = rejection.as_str(), "login rejected");
                Err(AuthError::AuthFailure)
            }
        }
    }

    async fn check<S>(
        &self,
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<Result<IdentityRecord, Rejection>, AuthError>
    where
        S: CredentialStore + ?Sized,
    {
        let Some(user) = store.find_by_username(username).await? else {
            let _ = non_truncating_verify(password, &self.decoy_hash);
            return Ok(Err(Rejection::NotFound));
        };

        // Over-long input and unparseable stored hashes count as a mismatch.
        if non_truncating_verify(password, &user.password_hash).unwrap_or(false) {
            Ok(Ok(user))
        } else {
            Ok(Err(Rejection::InvalidCredential))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;
    use crate::error::StoreError;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn register_then_authenticate() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();

        let created = auth.register(&store, "alice", "secret123").await.unwrap();
        assert_ne!(created.password_hash, "secret123");

        let user = auth.authenticate(&store, "alice", "secret123").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.id, created.id);
    }

    #[tokio::test]
    async fn salts_differ_per_registration() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();

        let a = auth.register(&store, "alice", "same-password").await.unwrap();
        let b = auth.register(&store, "bob", "same-password").await.unwrap();
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();
        auth.register(&store, "alice", "secret123").await.unwrap();

        let wrong = auth.authenticate(&store, "alice", "wrong").await.unwrap_err();
        let nobody = auth.authenticate(&store, "nobody", "x").await.unwrap_err();

        assert!(matches!(wrong, AuthError::AuthFailure));
        assert!(matches!(nobody, AuthError::AuthFailure));
        assert_eq!(wrong.to_string(), nobody.to_string());
    }

    #[tokio::test]
    async fn rejection_reason_is_tracked_internally() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();
        auth.register(&store, "alice", "secret123").await.unwrap();

        assert_eq!(
            auth.check(&store, "nobody", "x").await.unwrap().unwrap_err(),
            Rejection::NotFound
        );
        assert_eq!(
            auth.check(&store, "alice", "Secret123").await.unwrap().unwrap_err(),
            Rejection::InvalidCredential
        );
    }

    #[tokio::test]
    async fn empty_credentials_are_refused() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();

        assert!(matches!(
            auth.register(&store, "", "pw").await,
            Err(AuthError::EmptyCredential)
        ));
        assert!(matches!(
            auth.register(&store, "alice", "").await,
            Err(AuthError::EmptyCredential)
        ));
        assert!(store.find_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_registration_surfaces_storage_error() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();
        auth.register(&store, "alice", "one").await.unwrap();

        assert!(matches!(
            auth.register(&store, "alice", "two").await,
            Err(AuthError::Storage(StoreError::DuplicateUsername))
        ));
        // The original password still works.
        assert!(auth.authenticate(&store, "alice", "one").await.is_ok());
    }

    #[tokio::test]
    async fn bytes_past_the_bcrypt_limit_are_not_ignored() {
        let store = MemoryUserStore::new();
        let auth = Authenticator::new(TEST_COST).unwrap();

        assert!(matches!(
            auth.register(&store, "u100", &"a".repeat(100)).await,
            Err(AuthError::PasswordTooLong)
        ));
        assert!(store.find_by_username("u100").await.unwrap().is_none());

        let exact = "a".repeat(72);
        auth.register(&store, "u72", &exact).await.unwrap();
        assert!(auth.authenticate(&store, "u72", &exact).await.is_ok());

        let extended = format!("{exact}X");
        assert!(matches!(
            auth.authenticate(&store, "u72", &extended).await,
            Err(AuthError::AuthFailure)
        ));
    }
}
