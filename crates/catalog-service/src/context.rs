//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_auth::Claims;
use catalog_core::error::AppError;
use catalog_entity::user::UserRole;

/// Message returned when a non-admin attempts a catalog write.
pub const ADMIN_REQUIRED: &str = "Admin access required";

/// Context for the current authenticated request.
///
/// Extracted by the HTTP layer and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// The user's email at the time the token was issued.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: UserRole, email: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            email: email.into(),
            request_time: Utc::now(),
        }
    }

    /// Build a context from verified token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.sub, claims.role, claims.email.clone())
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fail with an authorization error unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization(ADMIN_REQUIRED))
        }
    }
}
