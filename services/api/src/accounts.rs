//! Account registration

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use common::error::DatabaseError;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    error::ApiError,
    models::{
        RegisterRequest,
        user::{NewUser, Role, User},
    },
    repositories::UserStore,
    validation::{normalize_email, required},
};

/// Registration failures
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Missing email, password, or username")]
    MissingFields,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for AccountError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate(_) => AccountError::AlreadyExists,
            other => AccountError::Database(other),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingFields => {
                ApiError::InvalidRequest("Missing email, password, or username".to_string())
            }
            AccountError::AlreadyExists => ApiError::AlreadyExists,
            AccountError::Hashing(_) => ApiError::InternalServerError,
            AccountError::Database(e) => ApiError::Database(e),
        }
    }
}

/// Hash a password with Argon2 and a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Register a new account with the default role
pub async fn register(store: &dyn UserStore, request: &RegisterRequest) -> Result<User, AccountError> {
    let (Some(email), Some(password), Some(user_name)) = (
        required(request.email.as_deref()),
        request.password.as_deref().filter(|p| !p.is_empty()),
        required(request.user_name.as_deref()),
    ) else {
        return Err(AccountError::MissingFields);
    };

    let email = normalize_email(email);

    if store.find_by_email(&email).await?.is_some() {
        info!("Registration rejected, email already in use");
        return Err(AccountError::AlreadyExists);
    }

    let password_hash = hash_password(password).inspect_err(|e| error!("{}", e))?;

    let user = store
        .create(&NewUser {
            email,
            user_name: user_name.to_string(),
            password_hash,
            role: Role::User,
        })
        .await?;

    info!("Registered user {} at {}", user.id, user.created_at);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryUserStore;
    use argon2::{PasswordHash, PasswordVerifier};

    fn request(email: &str, password: &str, user_name: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            user_name: Some(user_name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_normalizes_and_hashes() {
        let store = InMemoryUserStore::new();

        let user = register(&store, &request("  Alice@X.com ", "hunter2", " Alice "))
            .await
            .expect("registration should succeed");

        assert_eq!(user.email, "alice@x.com");
        assert_eq!(user.user_name, "Alice");
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "hunter2");

        let parsed = PasswordHash::new(&user.password_hash).unwrap();
        assert!(Argon2::default().verify_password(b"hunter2", &parsed).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryUserStore::new();
        register(&store, &request("a@x.com", "p", "A")).await.unwrap();

        let err = register(&store, &request("A@X.COM", "p", "A")).await.unwrap_err();
        assert!(matches!(err, AccountError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let store = InMemoryUserStore::new();

        let err = register(&store, &request("a@x.com", "", "A")).await.unwrap_err();
        assert!(matches!(err, AccountError::MissingFields));

        let err = register(
            &store,
            &RegisterRequest {
                email: Some("a@x.com".to_string()),
                password: Some("p".to_string()),
                user_name: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccountError::MissingFields));
        assert!(store.get("a@x.com").is_none());
    }

    #[test]
    fn test_unique_violation_maps_to_already_exists() {
        let err = AccountError::from(DatabaseError::Duplicate("users_email_key".into()));
        assert!(matches!(err, AccountError::AlreadyExists));
        assert!(matches!(ApiError::from(err), ApiError::AlreadyExists));
    }
}
