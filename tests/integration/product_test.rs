//! Product CRUD, listing, inventory and reporting.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, id_of};

#[tokio::test]
async fn test_create_and_fetch_product() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;

    let id = app
        .create_product(&admin, "Linen Shirt", &category, 40.0, &[("LIN-M", 45.0, 3)])
        .await;

    let response = app
        .request("GET", &format!("/api/products/{id}"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let product = response.data();
    assert_eq!(product["name"], "Linen Shirt");
    assert_eq!(product["category"], category.as_str());
    assert_eq!(product["basePrice"], 40.0);
    assert_eq!(product["variants"][0]["sku"], "LIN-M");
    assert_eq!(product["isInStock"], true);
    assert_eq!(product["discountPercentage"], 0.0);
}

#[tokio::test]
async fn test_writes_require_admin() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let user = app.register_user("shopper@example.com").await;
    let category = app.create_category(&admin, "Shirts", None).await;

    let body = json!({
        "name": "Linen Shirt",
        "description": "Breathable summer linen",
        "category": category,
        "basePrice": 40.0,
    });

    let anonymous = app
        .request("POST", "/api/products", Some(body.clone()), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app
        .request("POST", "/api/products", Some(body), Some(&user))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.message(), "Admin access required");
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;

    let response = app
        .request(
            "POST",
            "/api/products",
            Some(json!({
                "name": "X",
                "description": "short",
                "category": category,
                "basePrice": -1.0,
                "variants": [{ "sku": "", "price": 1.0, "stock": 1 }],
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .expect("field errors")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"description"));
    assert!(fields.contains(&"basePrice"));
    assert!(fields.contains(&"variants[0].sku"));
}

#[tokio::test]
async fn test_unknown_category_and_duplicate_sku() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;
    app.create_product(&admin, "Linen Shirt", &category, 40.0, &[("SKU-1", 45.0, 3)])
        .await;

    let unknown = app
        .request(
            "POST",
            "/api/products",
            Some(json!({
                "name": "Ghost Shirt",
                "description": "Belongs to nothing at all",
                "category": "00000000-0000-0000-0000-000000000001",
                "basePrice": 10.0,
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.message(), "Category not found");

    let duplicate = app
        .request(
            "POST",
            "/api/products",
            Some(json!({
                "name": "Cotton Shirt",
                "description": "Plain everyday cotton",
                "category": category,
                "basePrice": 20.0,
                "variants": [{ "sku": "SKU-1", "price": 20.0, "stock": 1 }],
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.message(), "SKU 'SKU-1' already exists");
}

#[tokio::test]
async fn test_list_pagination_and_filters() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let shirts = app.create_category(&admin, "Shirts", None).await;
    let hats = app.create_category(&admin, "Hats", None).await;

    app.create_product(&admin, "Alpha Shirt", &shirts, 10.0, &[("A-1", 10.0, 5)])
        .await;
    app.create_product(&admin, "Beta Shirt", &shirts, 30.0, &[("B-1", 30.0, 0)])
        .await;
    app.create_product(&admin, "Gamma Hat", &hats, 20.0, &[("G-1", 20.0, 50)])
        .await;

    let first = app
        .request("GET", "/api/products?page=1&limit=2", None, None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let page = first.data();
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["name"], "Alpha Shirt");
    assert_eq!(page["pagination"]["totalItems"], 3);
    assert_eq!(page["pagination"]["totalPages"], 2);
    assert_eq!(page["pagination"]["hasNextPage"], true);
    assert_eq!(page["pagination"]["hasPrevPage"], false);

    let by_category = app
        .request("GET", &format!("/api/products?category={shirts}"), None, None)
        .await;
    assert_eq!(by_category.data()["pagination"]["totalItems"], 2);

    let by_price = app
        .request(
            "GET",
            "/api/products?minPrice=15&sortBy=basePrice&sortOrder=desc",
            None,
            None,
        )
        .await;
    let names: Vec<&str> = by_price.data()["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Beta Shirt", "Gamma Hat"]);

    let out_of_stock = app
        .request("GET", "/api/products?inStock=false", None, None)
        .await;
    assert_eq!(out_of_stock.data()["items"][0]["name"], "Beta Shirt");
    assert_eq!(out_of_stock.data()["pagination"]["totalItems"], 1);

    let bad_sort = app
        .request("GET", "/api/products?sortBy=popularity", None, None)
        .await;
    assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_and_missing_ids() {
    let app = TestApp::new();

    let malformed = app
        .request("GET", "/api/products/not-a-uuid", None, None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.message(), "Invalid ID format");

    let missing = app
        .request(
            "GET",
            "/api/products/00000000-0000-0000-0000-000000000001",
            None,
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.message(), "Product not found");
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;
    let id = app
        .create_product(&admin, "Linen Shirt", &category, 40.0, &[])
        .await;

    let updated = app
        .request(
            "PUT",
            &format!("/api/products/{id}"),
            Some(json!({ "basePrice": 35.5, "tags": ["summer"] })),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["basePrice"], 35.5);
    assert_eq!(updated.data()["name"], "Linen Shirt");
    assert_eq!(updated.data()["tags"][0], "summer");

    let deleted = app
        .request("DELETE", &format!("/api/products/{id}"), None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .request("GET", &format!("/api/products/{id}"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inventory_and_low_stock() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;
    let created = app
        .request(
            "POST",
            "/api/products",
            Some(json!({
                "name": "Linen Shirt",
                "description": "Breathable summer linen",
                "category": category,
                "basePrice": 40.0,
                "variants": [{ "sku": "LIN-M", "price": 45.0, "stock": 50 }],
            })),
            Some(&admin),
        )
        .await;
    let product_id = id_of(&created);
    let variant_id = created.data()["variants"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let low = app.request("GET", "/api/products/low-stock", None, None).await;
    assert_eq!(low.data()["pagination"]["totalItems"], 0);

    let negative = app
        .request(
            "POST",
            "/api/products/inventory",
            Some(json!({ "productId": product_id, "variantId": variant_id, "quantity": -1 })),
            Some(&admin),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let updated = app
        .request(
            "POST",
            "/api/products/inventory",
            Some(json!({ "productId": product_id, "variantId": variant_id, "quantity": 4 })),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["stock"], 4);

    let low = app.request("GET", "/api/products/low-stock", None, None).await;
    assert_eq!(low.data()["pagination"]["totalItems"], 1);
    assert_eq!(low.data()["items"][0]["id"], product_id.as_str());

    let stats = app.request("GET", "/api/products/stats", None, None).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.data()["totalProducts"], 1);
    assert_eq!(stats.data()["totalStock"], 4);
    assert_eq!(stats.data()["lowStockVariants"], 1);
    assert_eq!(
        stats.data()["categoryDistribution"][0]["categoryName"],
        "Shirts"
    );
}
