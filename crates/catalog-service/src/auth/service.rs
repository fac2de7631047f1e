//! Registration, login and account provisioning.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use catalog_auth::{IssuedToken, JwtEncoder, PasswordHasher, PasswordValidator};
use catalog_core::error::AppError;
use catalog_database::repositories::UserRepository;
use catalog_entity::user::{CreateUser, User, UserRole};

/// Message for every failed login, whatever the cause.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Self-service registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// An authenticated user with a fresh token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The user.
    pub user: User,
    /// Signed bearer token.
    #[serde(flatten)]
    pub token: IssuedToken,
}

/// Handles registration and credential checks.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    encoder: JwtEncoder,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        validator: PasswordValidator,
        encoder: JwtEncoder,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
        }
    }

    /// Register a regular user and sign them in.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AppError> {
        let user = self
            .create_user(&input.name, &input.email, &input.password, UserRole::User)
            .await?;
        let token = self.encoder.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let Some(user) = self.users.find_by_email(&email.to_lowercase()).await? else {
            self.hasher.verify_missing(password);
            warn!(email = %email, "Login failed: unknown email");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let token = self.encoder.issue(&user)?;
        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(AuthSession { user, token })
    }

    /// Create an account with the given role after enforcing the password
    /// policy and email uniqueness.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        self.validator.validate(password)?;

        let email = email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .users
            .insert(&User::new(CreateUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                role,
            }))
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Replace the password of the account registered under `email`.
    pub async fn reset_password(&self, email: &str, password: &str) -> Result<User, AppError> {
        self.validator.validate(password)?;

        let mut user = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        user.password_hash = self.hasher.hash_password(password)?;
        user.updated_at = Utc::now();
        let user = self.users.update(&user).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(user)
    }
}
