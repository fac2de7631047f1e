//! Category CRUD with hierarchy guards.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use catalog_core::error::AppError;
use catalog_database::repositories::{CategoryRepository, ProductRepository};
use catalog_entity::category::{
    Category, CategoryNode, CreateCategory, UpdateCategory, ancestors, build_tree, subcategories,
    would_create_cycle,
};

use crate::context::RequestContext;

/// A category with its direct children and breadcrumb trail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    /// The category itself.
    #[serde(flatten)]
    pub category: Category,
    /// Direct children.
    pub subcategories: Vec<Category>,
    /// Parents above the category, root first.
    pub ancestors: Vec<Category>,
}

/// Manages the category hierarchy.
#[derive(Debug, Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            categories,
            products,
        }
    }

    /// The full category forest.
    pub async fn list_tree(&self) -> Result<Vec<CategoryNode>, AppError> {
        let all = self.categories.find_all().await?;
        Ok(build_tree(&all))
    }

    /// One category with subcategories and ancestors.
    pub async fn get_category(&self, id: Uuid) -> Result<CategoryDetail, AppError> {
        let all = self.categories.find_all().await?;
        let category = all
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Category not found"))?;

        Ok(CategoryDetail {
            subcategories: subcategories(&all, id),
            ancestors: ancestors(&all, id),
            category,
        })
    }

    /// Create a category under an optional parent.
    pub async fn create_category(
        &self,
        ctx: &RequestContext,
        data: CreateCategory,
    ) -> Result<Category, AppError> {
        ctx.require_admin()?;
        self.ensure_name_free(&data.name, None).await?;
        if let Some(parent_id) = data.parent_id {
            self.require_parent(parent_id).await?;
        }

        let category = self.categories.insert(&Category::new(data)).await?;

        info!(
            user_id = %ctx.user_id,
            category_id = %category.id,
            parent_id = ?category.parent_id,
            "Category created"
        );

        Ok(category)
    }

    /// Apply a partial update, re-checking name and parent.
    pub async fn update_category(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        changes: UpdateCategory,
    ) -> Result<Category, AppError> {
        ctx.require_admin()?;
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))?;

        if let Some(name) = changes.name.as_deref() {
            if name != category.name {
                self.ensure_name_free(name, Some(id)).await?;
            }
        }

        if let Some(Some(parent_id)) = changes.parent_id {
            if parent_id == id {
                return Err(AppError::validation("Category cannot be its own parent"));
            }
            self.require_parent(parent_id).await?;
            let all = self.categories.find_all().await?;
            if would_create_cycle(&all, id, parent_id) {
                return Err(AppError::validation(
                    "Category parent would create a cycle",
                ));
            }
        }

        category.apply_update(changes);
        let category = self.categories.update(&category).await?;

        info!(user_id = %ctx.user_id, category_id = %id, "Category updated");
        Ok(category)
    }

    /// Delete a leaf category that no product references.
    pub async fn delete_category(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        ctx.require_admin()?;
        if self.categories.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Category not found"));
        }

        if self.categories.count_children(id).await? > 0 {
            return Err(AppError::conflict(
                "Cannot delete category with subcategories. Delete or reassign subcategories first.",
            ));
        }
        if self.products.count_by_category(id).await? > 0 {
            return Err(AppError::conflict(
                "Cannot delete category with associated products. Reassign or delete products first.",
            ));
        }

        if !self.categories.delete(id).await? {
            return Err(AppError::not_found("Category not found"));
        }

        info!(user_id = %ctx.user_id, category_id = %id, "Category deleted");
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, current: Option<Uuid>) -> Result<(), AppError> {
        match self.categories.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != current => Err(AppError::conflict(format!(
                "Category with name '{name}' already exists"
            ))),
            _ => Ok(()),
        }
    }

    async fn require_parent(&self, parent_id: Uuid) -> Result<(), AppError> {
        self.categories
            .find_by_id(parent_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Parent category not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::error::ErrorKind;
    use catalog_database::Store;
    use catalog_entity::product::{CreateProduct, Product};
    use catalog_entity::user::UserRole;

    fn admin() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), UserRole::Admin, "admin@example.com")
    }

    fn create(name: &str, parent_id: Option<Uuid>) -> CreateCategory {
        CreateCategory {
            name: name.into(),
            description: None,
            parent_id,
            is_active: true,
        }
    }

    fn service(store: &Store) -> CategoryService {
        CategoryService::new(store.categories.clone(), store.products.clone())
    }

    #[tokio::test]
    async fn test_parent_child_delete_order() {
        let store = Store::memory();
        let svc = service(&store);
        let ctx = admin();

        let a = svc.create_category(&ctx, create("A", None)).await.unwrap();
        let b = svc.create_category(&ctx, create("B", Some(a.id))).await.unwrap();

        let tree = svc.list_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, a.id);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].category.id, b.id);

        let err = svc.delete_category(&ctx, a.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        svc.delete_category(&ctx, b.id).await.unwrap();
        svc.delete_category(&ctx, a.id).await.unwrap();
        assert!(svc.list_tree().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_products() {
        let store = Store::memory();
        let svc = service(&store);
        let ctx = admin();
        let shoes = svc.create_category(&ctx, create("Shoes", None)).await.unwrap();

        store
            .products
            .insert(&Product::new(CreateProduct {
                name: "Runner".into(),
                description: "Road shoe".into(),
                category_id: shoes.id,
                base_price: 90.0,
                variants: vec![],
                images: vec![],
                tags: vec![],
                is_active: true,
            }))
            .await
            .unwrap();

        let err = svc.delete_category(&ctx, shoes.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("associated products"));
    }

    #[tokio::test]
    async fn test_name_must_be_unique() {
        let store = Store::memory();
        let svc = service(&store);
        let ctx = admin();
        svc.create_category(&ctx, create("Bags", None)).await.unwrap();
        let err = svc.create_category(&ctx, create("Bags", None)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_parent_must_exist() {
        let store = Store::memory();
        let svc = service(&store);
        let err = svc
            .create_category(&admin(), create("Loose", Some(Uuid::new_v4())))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cycles_rejected() {
        let store = Store::memory();
        let svc = service(&store);
        let ctx = admin();
        let a = svc.create_category(&ctx, create("A", None)).await.unwrap();
        let b = svc.create_category(&ctx, create("B", Some(a.id))).await.unwrap();
        let c = svc.create_category(&ctx, create("C", Some(b.id))).await.unwrap();

        let err = svc
            .update_category(
                &ctx,
                a.id,
                UpdateCategory {
                    parent_id: Some(Some(a.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.message, "Category cannot be its own parent");

        let err = svc
            .update_category(
                &ctx,
                a.id,
                UpdateCategory {
                    parent_id: Some(Some(c.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("cycle"));

        // Detaching to the root is always allowed.
        let moved = svc
            .update_category(
                &ctx,
                c.id,
                UpdateCategory {
                    parent_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(moved.is_root());
    }

    #[tokio::test]
    async fn test_detail_has_subcategories_and_ancestors() {
        let store = Store::memory();
        let svc = service(&store);
        let ctx = admin();
        let a = svc.create_category(&ctx, create("A", None)).await.unwrap();
        let b = svc.create_category(&ctx, create("B", Some(a.id))).await.unwrap();
        let c = svc.create_category(&ctx, create("C", Some(b.id))).await.unwrap();

        let detail = svc.get_category(b.id).await.unwrap();
        assert_eq!(detail.subcategories.len(), 1);
        assert_eq!(detail.subcategories[0].id, c.id);
        assert_eq!(detail.ancestors.len(), 1);
        assert_eq!(detail.ancestors[0].id, a.id);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "B");
        assert!(json["subcategories"].is_array());
    }

    #[tokio::test]
    async fn test_writes_require_admin() {
        let store = Store::memory();
        let svc = service(&store);
        let user = RequestContext::new(Uuid::new_v4(), UserRole::User, "u@example.com");
        let err = svc.create_category(&user, create("X", None)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}
