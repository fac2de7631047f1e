//! PostgreSQL product repository.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use catalog_core::error::{AppError, ErrorKind};
use catalog_core::result::AppResult;
use catalog_core::types::PageResponse;
use catalog_entity::product::query::LowStockQuery;
use catalog_entity::product::{
    CategoryCount, LOW_STOCK_THRESHOLD, Product, ProductQuery, ProductStats,
};

use super::{escape_like, map_unique};
use crate::repositories::{DiscountOverwrite, ProductRepository};

const COLUMNS: &str = "id, name, description, category_id, base_price, variants, images, tags, \
                       is_active, discount_percentage, discount_collection_id, created_at, updated_at";

const SKU_CONSTRAINT: &str = "product_skus_pkey";

/// Repository for products stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the `WHERE` clause for a listing query.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    builder.push(" WHERE TRUE");

    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }

    if let Some(search) = query.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE t ILIKE ")
            .push_bind(pattern)
            .push("))");
    }

    if let Some(min) = query.min_price {
        builder.push(" AND base_price >= ").push_bind(min);
    }
    if let Some(max) = query.max_price {
        builder.push(" AND base_price <= ").push_bind(max);
    }

    match query.in_stock {
        Some(true) => {
            builder.push(
                " AND EXISTS (SELECT 1 FROM jsonb_array_elements(variants) AS v \
                 WHERE (v->>'stock')::bigint > 0)",
            );
        }
        Some(false) => {
            builder.push(
                " AND NOT EXISTS (SELECT 1 FROM jsonb_array_elements(variants) AS v \
                 WHERE (v->>'stock')::bigint > 0)",
            );
        }
        None => {}
    }

    if !query.tags.is_empty() {
        builder.push(" AND tags @> ").push_bind(query.tags.clone());
    }

    if query.color.is_some() || query.size.is_some() {
        builder.push(" AND EXISTS (SELECT 1 FROM jsonb_array_elements(variants) AS v WHERE TRUE");
        if let Some(color) = query.color.as_deref() {
            builder.push(" AND v->>'color' = ").push_bind(color.to_string());
        }
        if let Some(size) = query.size.as_deref() {
            builder.push(" AND v->>'size' = ").push_bind(size.to_string());
        }
        builder.push(")");
    }
}

fn low_stock_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &LowStockQuery) {
    builder
        .push(
            " WHERE EXISTS (SELECT 1 FROM jsonb_array_elements(variants) AS v \
             WHERE (v->>'stock')::bigint <= ",
        )
        .push_bind(query.threshold)
        .push(")");
    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Replace the product's rows in `product_skus` with its current variants.
async fn write_skus(conn: &mut PgConnection, product: &Product) -> AppResult<()> {
    sqlx::query("DELETE FROM product_skus WHERE product_id = $1")
        .bind(product.id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to release product SKUs"))?;

    let skus: Vec<String> = product.variants.iter().map(|v| v.sku.clone()).collect();
    sqlx::query(
        "INSERT INTO product_skus (sku, product_id) \
         SELECT DISTINCT s, $2 FROM unnest($1::text[]) AS s",
    )
    .bind(&skus)
    .bind(product.id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_unique(
            e,
            SKU_CONSTRAINT,
            "A variant SKU already exists",
            "Failed to record product SKUs",
        )
    })?;
    Ok(())
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        sqlx::query_as::<_, Product>(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find product by id"))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = ANY($1) ORDER BY array_position($1, id)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find products by ids"))
    }

    async fn list(&self, query: &ProductQuery) -> AppResult<PageResponse<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count products"))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM products"));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort_by.column())
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(query.page.limit as i64)
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let products = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list products"))?;

        Ok(PageResponse::new(products, query.page, total as u64))
    }

    async fn list_low_stock(&self, query: &LowStockQuery) -> AppResult<PageResponse<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        low_stock_filter(&mut count, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count low-stock products"))?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM products"));
        low_stock_filter(&mut select, query);
        select
            .push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(query.page.limit as i64)
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let products = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list low-stock products"))?;

        Ok(PageResponse::new(products, query.page, total as u64))
    }

    async fn insert(&self, product: &Product) -> AppResult<Product> {
        let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin transaction"))?;

        let inserted = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.base_price)
        .bind(Json(&product.variants))
        .bind(&product.images)
        .bind(&product.tags)
        .bind(product.is_active)
        .bind(product.discount_percentage)
        .bind(product.discount_collection_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to insert product"))?;

        write_skus(&mut tx, &inserted).await?;
        tx.commit().await.map_err(db_err("Failed to commit product insert"))?;
        Ok(inserted)
    }

    async fn update(&self, product: &Product) -> AppResult<Product> {
        let mut tx = self.pool.begin().await.map_err(db_err("Failed to begin transaction"))?;

        let updated = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $2, description = $3, category_id = $4, base_price = $5, \
             variants = $6, images = $7, tags = $8, is_active = $9, discount_percentage = $10, \
             discount_collection_id = $11, updated_at = $12 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.category_id)
        .bind(product.base_price)
        .bind(Json(&product.variants))
        .bind(&product.images)
        .bind(&product.tags)
        .bind(product.is_active)
        .bind(product.discount_percentage)
        .bind(product.discount_collection_id)
        .bind(product.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("Failed to update product"))?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", product.id)))?;

        write_skus(&mut tx, &updated).await?;
        tx.commit().await.map_err(db_err("Failed to commit product update"))?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_err("Failed to delete product"))
    }

    async fn sku_exists(&self, sku: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM product_skus \
             WHERE sku = $1 AND ($2::uuid IS NULL OR product_id <> $2))",
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to check SKU"))
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<u64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map(|n| n as u64)
            .map_err(db_err("Failed to count products by category"))
    }

    async fn stats(&self) -> AppResult<ProductStats> {
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count products"))?;

        let (total_variants, total_stock, average_price, low_stock): (i64, i64, f64, i64) =
            sqlx::query_as(
                "SELECT COUNT(v), \
                 COALESCE(SUM((v->>'stock')::bigint), 0)::bigint, \
                 COALESCE(AVG((v->>'price')::float8), 0)::float8, \
                 COUNT(v) FILTER (WHERE (v->>'stock')::bigint <= $1) \
                 FROM products p CROSS JOIN LATERAL jsonb_array_elements(p.variants) AS v",
            )
            .bind(LOW_STOCK_THRESHOLD)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to aggregate variants"))?;

        let rows: Vec<(Uuid, Option<String>, i64)> = sqlx::query_as(
            "SELECT p.category_id, c.name, COUNT(*)::bigint AS n \
             FROM products p LEFT JOIN categories c ON c.id = p.category_id \
             GROUP BY p.category_id, c.name ORDER BY n DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to group products by category"))?;

        Ok(ProductStats {
            total_products: total_products as u64,
            total_variants: total_variants as u64,
            total_stock,
            average_price,
            low_stock_variants: low_stock as u64,
            category_distribution: rows
                .into_iter()
                .map(|(category_id, category_name, count)| CategoryCount {
                    category_id,
                    category_name,
                    count: count as u64,
                })
                .collect(),
        })
    }

    async fn stamp_discount(
        &self,
        product_ids: &[Uuid],
        collection_id: Uuid,
        percentage: f64,
    ) -> AppResult<Vec<DiscountOverwrite>> {
        let rows: Vec<(Uuid, Option<Uuid>)> = sqlx::query_as(
            "WITH prev AS ( \
                 SELECT id, discount_collection_id FROM products WHERE id = ANY($1) FOR UPDATE \
             ) \
             UPDATE products p \
             SET discount_percentage = $2, discount_collection_id = $3, updated_at = NOW() \
             FROM prev WHERE p.id = prev.id \
             RETURNING p.id, prev.discount_collection_id",
        )
        .bind(product_ids)
        .bind(percentage)
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to apply collection discount"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(product_id, previous)| {
                previous
                    .filter(|owner| *owner != collection_id)
                    .map(|previous_collection_id| DiscountOverwrite {
                        product_id,
                        previous_collection_id,
                    })
            })
            .collect())
    }

    async fn clear_discount(&self, product_ids: &[Uuid], collection_id: Uuid) -> AppResult<u64> {
        sqlx::query(
            "UPDATE products SET discount_percentage = 0, discount_collection_id = NULL, \
             updated_at = NOW() WHERE id = ANY($1) AND discount_collection_id = $2",
        )
        .bind(product_ids)
        .bind(collection_id)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected())
        .map_err(db_err("Failed to clear collection discount"))
    }
}
