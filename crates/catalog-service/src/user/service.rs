//! Profile reads and updates for the signed-in user.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use catalog_core::error::AppError;
use catalog_database::repositories::UserRepository;
use catalog_entity::user::{UpdateProfile, User};

use crate::context::RequestContext;

/// Manages the caller's own profile.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The caller's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Change the caller's name and/or email.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        changes: UpdateProfile,
    ) -> Result<User, AppError> {
        if changes.name.is_none() && changes.email.is_none() {
            return Err(AppError::validation("Provide a name or email to update"));
        }

        let mut user = self.get_profile(ctx).await?;

        if let Some(email) = changes.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(AppError::conflict("Email already in use"));
                    }
                }
                user.email = email;
            }
        }
        if let Some(name) = changes.name {
            user.name = name.trim().to_string();
        }
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
