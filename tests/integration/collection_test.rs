//! Collections, membership and discount propagation.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, id_of};

async fn discount_of(app: &TestApp, product: &str) -> f64 {
    app.request("GET", &format!("/api/products/{product}"), None, None)
        .await
        .data()["discountPercentage"]
        .as_f64()
        .expect("discount")
}

#[tokio::test]
async fn test_discount_mirrored_then_reset() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;
    let p1 = app
        .create_product(&admin, "Linen Shirt", &category, 40.0, &[])
        .await;
    let p2 = app
        .create_product(&admin, "Cotton Shirt", &category, 20.0, &[])
        .await;

    let created = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({
                "name": "Summer Sale",
                "description": "Warm weather picks",
                "products": [p1],
                "discountPercentage": 20,
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let collection = id_of(&created);
    assert_eq!(created.data()["products"][0]["id"], p1.as_str());
    assert_eq!(created.data()["isRunning"], true);
    assert_eq!(discount_of(&app, &p1).await, 20.0);
    assert_eq!(discount_of(&app, &p2).await, 0.0);

    let added = app
        .request(
            "POST",
            &format!("/api/collections/{collection}/products"),
            Some(json!({ "productId": p2 })),
            Some(&admin),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.data()["products"].as_array().unwrap().len(), 2);
    assert_eq!(discount_of(&app, &p2).await, 20.0);

    let again = app
        .request(
            "POST",
            &format!("/api/collections/{collection}/products"),
            Some(json!({ "productId": p2 })),
            Some(&admin),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.message(), "Product already in collection");

    let repriced = app
        .request(
            "PUT",
            &format!("/api/collections/{collection}"),
            Some(json!({ "discountPercentage": 35 })),
            Some(&admin),
        )
        .await;
    assert_eq!(repriced.status, StatusCode::OK);
    assert_eq!(discount_of(&app, &p1).await, 35.0);

    let removed = app
        .request(
            "DELETE",
            &format!("/api/collections/{collection}/products/{p2}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(discount_of(&app, &p2).await, 0.0);

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/collections/{collection}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(discount_of(&app, &p1).await, 0.0);

    let gone = app
        .request("GET", &format!("/api/collections/{collection}"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_active_listing_respects_window() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let running = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({ "name": "Now", "description": "Running today" })),
            Some(&admin),
        )
        .await;
    assert_eq!(running.status, StatusCode::CREATED);

    let future = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({
                "name": "Later",
                "description": "Starts next year",
                "startDate": "2999-01-01T00:00:00Z",
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(future.status, StatusCode::CREATED);

    let all = app.request("GET", "/api/collections", None, None).await;
    assert_eq!(all.data().as_array().unwrap().len(), 2);

    let active = app
        .request("GET", "/api/collections/active", None, None)
        .await;
    let names: Vec<&str> = active
        .data()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Now"]);
}

#[tokio::test]
async fn test_collection_rules() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let bad_window = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({
                "name": "Backwards",
                "description": "Ends before it starts",
                "startDate": "2030-02-01T00:00:00Z",
                "endDate": "2030-01-01T00:00:00Z",
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(bad_window.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_window.message(), "End date must be after start date");

    let unknown_product = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({
                "name": "Ghosts",
                "description": "Nothing real",
                "products": ["00000000-0000-0000-0000-000000000001"],
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(unknown_product.status, StatusCode::NOT_FOUND);

    let first = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({ "name": "Unique", "description": "First one" })),
            Some(&admin),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let duplicate = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({ "name": "Unique", "description": "Second one" })),
            Some(&admin),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.message(), "Collection with this name already exists");

    let out_of_range = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({ "name": "Too Much", "description": "Over 100", "discountPercentage": 150 })),
            Some(&admin),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deleted_product_leaves_collections() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let category = app.create_category(&admin, "Shirts", None).await;
    let product = app
        .create_product(&admin, "Linen Shirt", &category, 40.0, &[])
        .await;

    let created = app
        .request(
            "POST",
            "/api/collections",
            Some(json!({ "name": "Sale", "description": "On sale", "products": [product] })),
            Some(&admin),
        )
        .await;
    let collection = id_of(&created);

    app.request("DELETE", &format!("/api/products/{product}"), None, Some(&admin))
        .await;

    let view = app
        .request("GET", &format!("/api/collections/{collection}"), None, None)
        .await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(view.data()["products"].as_array().unwrap().is_empty());
}
