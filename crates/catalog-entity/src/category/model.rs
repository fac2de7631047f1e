//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A node in the category forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// Category name, unique across the catalog.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category (None for roots).
    #[serde(rename = "parent")]
    pub parent_id: Option<Uuid>,
    /// Whether the category is shown.
    pub is_active: bool,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Build a new category from creation data.
    pub fn new(data: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            parent_id: data.parent_id,
            is_active: data.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a root category (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Apply a partial update.
    pub fn apply_update(&mut self, changes: UpdateCategory) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(parent_id) = changes.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// Data required to create a new category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent category (None for root).
    pub parent_id: Option<Uuid>,
    /// Shown flag.
    pub is_active: bool,
}

/// Partial category update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// `Some(None)` detaches the category to the root; `None` leaves the
    /// parent unchanged.
    pub parent_id: Option<Option<Uuid>>,
    /// New shown flag.
    pub is_active: Option<bool>,
}
