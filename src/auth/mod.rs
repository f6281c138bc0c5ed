//! User accounts and token-based authentication.
//!
//! [`AuthService`] registers and logs in users stored in the `users` collection
//! and hands out JWTs through [`TokenIssuer`]. Passwords are kept as salted SHA-256
//! hashes (see [`password`]).
//!
//! # Example Usage
//!
//! ```rust
//! use school_portal::auth::{AuthService, TokenIssuer};
//! use school_portal::model::{LoginRequest, RegisterRequest};
//! use school_portal::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthService::new(InMemoryStorage::new(), TokenIssuer::new("secret")).await?;
//! auth.register(RegisterRequest {
//!     username: Some("jane".into()),
//!     email: Some("jane@x.com".into()),
//!     password: Some("hunter22".into()),
//!     name: Some("Jane Doe".into()),
//!     role: None,
//! })
//! .await?;
//!
//! let session = auth
//!     .login(LoginRequest { email: Some("jane@x.com".into()), password: Some("hunter22".into()) })
//!     .await?;
//! assert_eq!(auth.verify_token(&session.token)?.sub, session.user.id);
//! # Ok(())
//! # }
//! ```

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer};

use crate::model::{LoginRequest, PublicUser, RegisterRequest, Role, User};
use crate::storage::{StorageError, StorageKey, StorageProvider};
use crate::validation::{FieldError, describe_errors};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Collection holding user accounts.
pub const USERS: &str = "users";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {}", describe_errors(.errors))]
    InvalidInput { errors: Vec<FieldError> },

    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Token plus the public view of the account it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Account registration and login over any datastore.
#[derive(Clone)]
pub struct AuthService<S: StorageProvider> {
    storage: S,
    tokens: TokenIssuer,
}

impl<S: StorageProvider> AuthService<S> {
    /// Create the service and declare the unique email index on users.
    pub async fn new(storage: S, tokens: TokenIssuer) -> Result<Self, AuthError> {
        storage
            .ensure_unique_index(USERS, "email")
            .await
            .map_err(storage_failure)?;
        Ok(Self { storage, tokens })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let mut errors = Vec::new();
        let username = required(request.username, "username", &mut errors);
        let email = required(request.email, "email", &mut errors).to_lowercase();
        let name = required(request.name, "name", &mut errors);
        // Passwords are taken verbatim, whitespace included.
        let password = request.password.filter(|p| !p.is_empty());
        if password.is_none() {
            errors.push(FieldError::new("password", "password is required"));
        }
        let role = match request.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => Role::default(),
            Some(role) => role.parse::<Role>().unwrap_or_else(|message| {
                errors.push(FieldError::new("role", message));
                Role::default()
            }),
        };
        let Some(password) = password.filter(|_| errors.is_empty()) else {
            warn!("Rejected registration: {}", describe_errors(&errors));
            return Err(AuthError::InvalidInput { errors });
        };

        info!("Registering user '{}' with role {}", email, role);
        if self.find_by_email(&email).await?.is_some() {
            warn!("Registration for existing email '{}'", email);
            return Err(AuthError::UserExists);
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: hash_password(&password),
            role,
            name,
        };
        self.store(&user).await?;

        self.respond(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request
            .email
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default();
        let password = request.password.unwrap_or_default();
        debug!("Login attempt for '{}'", email);

        let user = match self.find_by_email(&email).await? {
            Some(user) if verify_password(&password, &user.password_hash) => user,
            _ => {
                warn!("Failed login for '{}'", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        info!("User '{}' logged in", user.email);
        self.respond(&user)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens
            .verify(token)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Insert a user with an already hashed password. Used for seeding.
    pub async fn insert_user(&self, user: User) -> Result<PublicUser, AuthError> {
        self.store(&user).await?;
        Ok(PublicUser::from(&user))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let data = self
            .storage
            .get(StorageKey::new(USERS, id))
            .await
            .map_err(storage_failure)?;
        data.map(decode_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let matches = self
            .storage
            .find_by_attribute(USERS, "email", email)
            .await
            .map_err(storage_failure)?;

        matches
            .into_iter()
            .next()
            .map(|(_, data)| decode_user(data))
            .transpose()
    }

    async fn store(&self, user: &User) -> Result<(), AuthError> {
        let data = serde_json::to_value(user)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize user: {}", e)))?;
        self.storage
            .put(StorageKey::new(USERS, &user.id), data)
            .await
            .map_err(|e| match e {
                StorageError::UniqueViolation { .. } => AuthError::UserExists,
                other => storage_failure(other),
            })?;
        Ok(())
    }

    fn respond(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self
            .tokens
            .issue(&user.id, user.role)
            .map_err(|e| AuthError::Token(e.to_string()))?;
        Ok(AuthResponse {
            token,
            user: PublicUser::from(user),
        })
    }
}

fn required(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", field)));
    }
    value
}

fn decode_user(data: serde_json::Value) -> Result<User, AuthError> {
    serde_json::from_value(data)
        .map_err(|e| AuthError::Storage(format!("Corrupt user record: {}", e)))
}

fn storage_failure(e: StorageError) -> AuthError {
    error!("Storage error in auth: {}", e);
    AuthError::Storage(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    async fn service() -> AuthService<InMemoryStorage> {
        AuthService::new(InMemoryStorage::new(), TokenIssuer::new("test-secret"))
            .await
            .unwrap()
    }

    fn jane() -> RegisterRequest {
        RegisterRequest {
            username: Some("jane".to_string()),
            email: Some("Jane@X.com".to_string()),
            password: Some("s3cret!".to_string()),
            role: None,
            name: Some("Jane Doe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service().await;
        let registered = auth.register(jane()).await.unwrap();
        assert_eq!(registered.user.email, "jane@x.com");
        assert_eq!(registered.user.role, Role::Student);

        let session = auth
            .login(LoginRequest {
                email: Some("JANE@x.com ".to_string()),
                password: Some("s3cret!".to_string()),
            })
            .await
            .unwrap();
        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
        assert_eq!(claims.role, Role::Student);

        let found = auth.find_by_id(&claims.sub).await.unwrap().unwrap();
        assert_eq!(found.username, "jane");
        assert!(auth.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let auth = service().await;
        auth.register(jane()).await.unwrap();
        assert!(matches!(
            auth.register(jane()).await,
            Err(AuthError::UserExists)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let auth = service().await;
        auth.register(jane()).await.unwrap();

        let wrong = auth
            .login(LoginRequest {
                email: Some("jane@x.com".to_string()),
                password: Some("nope".to_string()),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = auth
            .login(LoginRequest {
                email: Some("ghost@x.com".to_string()),
                password: Some("s3cret!".to_string()),
            })
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let auth = service().await;
        let request = RegisterRequest {
            role: Some("principal".to_string()),
            ..RegisterRequest::default()
        };
        match auth.register(request).await {
            Err(AuthError::InvalidInput { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["username", "email", "name", "password", "role"]);
            }
            other => panic!("Expected InvalidInput, got {:?}", other.map(|r| r.user)),
        }
    }

    #[tokio::test]
    async fn test_explicit_role() {
        let auth = service().await;
        let request = RegisterRequest {
            role: Some("teacher".to_string()),
            ..jane()
        };
        assert_eq!(auth.register(request).await.unwrap().user.role, Role::Teacher);
    }
}
