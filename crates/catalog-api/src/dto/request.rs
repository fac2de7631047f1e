//! Request DTOs with validation.
//!
//! Bodies are camelCase JSON. Each DTO converts into the matching entity
//! input once it has passed validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use catalog_entity::category::{CreateCategory, UpdateCategory};
use catalog_entity::collection::{CreateCollection, UpdateCollection};
use catalog_entity::product::{CreateProduct, NewVariant, UpdateProduct};
use catalog_entity::user::UpdateProfile;
use catalog_service::{InventoryUpdate, RegisterInput};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

fn image_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    let valid = urls.iter().all(|u| {
        u.starts_with("http://") || u.starts_with("https://") || u.starts_with('/')
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("Images must be valid URLs".into()))
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("Must not be blank".into()))
    } else {
        Ok(())
    }
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    /// Login email.
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    /// Password; the strength policy is enforced by the auth service.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Login body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update body. At least one field is required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: Option<String>,
    /// New email.
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
        }
    }
}

// ── Products ─────────────────────────────────────────────────────────

/// One variant in a product body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantRequest {
    /// Size label.
    pub size: Option<String>,
    /// Color label.
    pub color: Option<String>,
    /// Stock keeping unit.
    #[validate(
        length(min = 1, message = "SKU is required"),
        custom(function = "non_blank")
    )]
    pub sku: String,
    /// Unit price.
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    /// Units on hand.
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i64,
    /// Variant discount.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_percentage: f64,
}

impl From<VariantRequest> for NewVariant {
    fn from(req: VariantRequest) -> Self {
        Self {
            size: req.size,
            color: req.color,
            sku: req.sku.trim().to_string(),
            price: req.price,
            stock: req.stock,
            discount_percentage: req.discount_percentage,
        }
    }
}

/// Product creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Display name.
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        custom(function = "non_blank")
    )]
    pub name: String,
    /// Description.
    #[validate(length(min = 10, message = "Description must be at least 10 characters long"))]
    pub description: String,
    /// Owning category id.
    pub category: Uuid,
    /// Base price.
    #[validate(range(min = 0.0, message = "Base price must not be negative"))]
    pub base_price: f64,
    /// Variants.
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<VariantRequest>,
    /// Image URLs.
    #[serde(default)]
    #[validate(custom(function = "image_urls"))]
    pub images: Vec<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Listed flag.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CreateProductRequest> for CreateProduct {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description,
            category_id: req.category,
            base_price: req.base_price,
            variants: req.variants.into_iter().map(NewVariant::from).collect(),
            images: req.images,
            tags: req.tags,
            is_active: req.is_active,
        }
    }
}

/// Product update body; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// New name.
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        custom(function = "non_blank")
    )]
    pub name: Option<String>,
    /// New description.
    #[validate(length(min = 10, message = "Description must be at least 10 characters long"))]
    pub description: Option<String>,
    /// New category.
    pub category: Option<Uuid>,
    /// New base price.
    #[validate(range(min = 0.0, message = "Base price must not be negative"))]
    pub base_price: Option<f64>,
    /// Replacement variants.
    #[validate(nested)]
    pub variants: Option<Vec<VariantRequest>>,
    /// Replacement images.
    #[validate(custom(function = "image_urls"))]
    pub images: Option<Vec<String>>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
    /// New listed flag.
    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for UpdateProduct {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            category_id: req.category,
            base_price: req.base_price,
            variants: req
                .variants
                .map(|v| v.into_iter().map(NewVariant::from).collect()),
            images: req.images,
            tags: req.tags,
            is_active: req.is_active,
        }
    }
}

/// Inventory update body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRequest {
    /// Product id.
    pub product_id: Uuid,
    /// Variant id.
    pub variant_id: Uuid,
    /// New stock level.
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i64,
}

impl From<InventoryRequest> for InventoryUpdate {
    fn from(req: InventoryRequest) -> Self {
        Self {
            product_id: req.product_id,
            variant_id: req.variant_id,
            quantity: req.quantity,
        }
    }
}

// ── Categories ───────────────────────────────────────────────────────

/// Category creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Name.
    #[validate(
        length(min = 1, max = 100, message = "Category name is required"),
        custom(function = "non_blank")
    )]
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Parent id; absent or `null` for a root.
    pub parent: Option<Uuid>,
    /// Shown flag.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl From<CreateCategoryRequest> for CreateCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description,
            parent_id: req.parent,
            is_active: req.is_active,
        }
    }
}

/// Category update body. `"parent": null` moves the category to the root.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    /// New name.
    #[validate(
        length(min = 1, max = 100, message = "Category name is required"),
        custom(function = "non_blank")
    )]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New parent.
    #[serde(default, deserialize_with = "double_option")]
    pub parent: Option<Option<Uuid>>,
    /// New shown flag.
    pub is_active: Option<bool>,
}

impl From<UpdateCategoryRequest> for UpdateCategory {
    fn from(req: UpdateCategoryRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            parent_id: req.parent,
            is_active: req.is_active,
        }
    }
}

// ── Collections ──────────────────────────────────────────────────────

/// Collection creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    /// Name.
    #[validate(
        length(min = 1, max = 100, message = "Collection name is required"),
        custom(function = "non_blank")
    )]
    pub name: String,
    /// Description.
    #[validate(
        length(min = 1, message = "Collection description is required"),
        custom(function = "non_blank")
    )]
    pub description: String,
    /// Initial member product ids.
    #[serde(default)]
    pub products: Vec<Uuid>,
    /// Enabled flag.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Window start; defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    /// Window end.
    pub end_date: Option<DateTime<Utc>>,
    /// Shared discount.
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_percentage: f64,
    /// Banner image.
    pub image_url: Option<String>,
}

impl From<CreateCollectionRequest> for CreateCollection {
    fn from(req: CreateCollectionRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description.trim().to_string(),
            product_ids: req.products,
            is_active: req.is_active,
            start_date: req.start_date,
            end_date: req.end_date,
            discount_percentage: req.discount_percentage,
            image_url: req.image_url,
        }
    }
}

/// Collection update body. `"endDate": null` removes the end date.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionRequest {
    /// New name.
    #[validate(
        length(min = 1, max = 100, message = "Collection name is required"),
        custom(function = "non_blank")
    )]
    pub name: Option<String>,
    /// New description.
    #[validate(
        length(min = 1, message = "Collection description is required"),
        custom(function = "non_blank")
    )]
    pub description: Option<String>,
    /// Replacement member list.
    pub products: Option<Vec<Uuid>>,
    /// New enabled flag.
    pub is_active: Option<bool>,
    /// New window start.
    pub start_date: Option<DateTime<Utc>>,
    /// New window end.
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    /// New discount.
    #[validate(range(min = 0.0, max = 100.0, message = "Discount must be between 0 and 100"))]
    pub discount_percentage: Option<f64>,
    /// New banner image.
    pub image_url: Option<String>,
}

impl From<UpdateCollectionRequest> for UpdateCollection {
    fn from(req: UpdateCollectionRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description.map(|d| d.trim().to_string()),
            product_ids: req.products,
            is_active: req.is_active,
            start_date: req.start_date,
            end_date: req.end_date,
            discount_percentage: req.discount_percentage,
            image_url: req.image_url,
        }
    }
}

/// Body for adding a product to a collection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    /// Product to add.
    pub product_id: Uuid,
}
