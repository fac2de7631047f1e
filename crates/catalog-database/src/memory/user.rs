//! In-memory user repository.

use async_trait::async_trait;
use uuid::Uuid;

use catalog_core::AppError;
use catalog_core::result::AppResult;
use catalog_entity::user::User;

use super::table::{Table, UniqueIndex};
use crate::repositories::UserRepository;

/// Users held in process memory.
#[derive(Debug)]
pub struct MemoryUserRepository {
    users: Table<User>,
    emails: UniqueIndex,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            users: Table::new(),
            emails: UniqueIndex::new(),
        }
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken() -> AppError {
    AppError::conflict("Email already registered")
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .emails
            .lookup(&email.to_lowercase())
            .and_then(|id| self.users.get(id)))
    }

    async fn insert(&self, user: &User) -> AppResult<User> {
        let key = user.email.to_lowercase();
        self.emails.claim(&key, user.id, email_taken)?;
        self.users
            .insert(user.id, user.clone())
            .inspect_err(|_| self.emails.release(&key, user.id))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let existing = self
            .users
            .get(user.id)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;

        let key = user.email.to_lowercase();
        self.emails.claim(&key, user.id, email_taken)?;
        let old_key = existing.email.to_lowercase();
        if old_key != key {
            self.emails.release(&old_key, user.id);
        }

        self.users
            .replace(user.id, user.clone())
            .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))
    }
}
