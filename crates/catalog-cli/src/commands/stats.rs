//! Inventory statistics.

use serde::Serialize;
use tabled::Tabled;

use catalog_core::error::AppError;
use catalog_service::ProductService;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct CategoryRow {
    category: String,
    products: u64,
}

/// Print the catalog summary and per-category breakdown
pub async fn execute(env: &str, format: OutputFormat) -> Result<(), AppError> {
    let (_, store) = super::open_store(env).await?;
    let products = ProductService::new(
        store.products.clone(),
        store.categories.clone(),
        store.collections.clone(),
    );
    let stats = products.stats().await;
    store.close().await;
    let stats = stats?;

    if format == OutputFormat::Json {
        output::print_item(&stats, format);
        return Ok(());
    }

    output::print_kv("Products", &stats.total_products.to_string());
    output::print_kv("Variants", &stats.total_variants.to_string());
    output::print_kv("Units in stock", &stats.total_stock.to_string());
    output::print_kv("Average price", &format!("{:.2}", stats.average_price));
    output::print_kv("Low-stock variants", &stats.low_stock_variants.to_string());
    println!();

    let rows: Vec<CategoryRow> = stats
        .category_distribution
        .iter()
        .map(|c| CategoryRow {
            category: c
                .category_name
                .clone()
                .unwrap_or_else(|| c.category_id.to_string()),
            products: c.count,
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
