//! Category tree, detail and delete rules.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_tree_and_delete_order() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let a = app.create_category(&admin, "A", None).await;
    let b = app.create_category(&admin, "B", Some(&a)).await;

    let tree = app.request("GET", "/api/categories", None, None).await;
    assert_eq!(tree.status, StatusCode::OK);
    let roots = tree.data().as_array().expect("tree");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], a.as_str());
    assert_eq!(roots[0]["children"][0]["id"], b.as_str());

    let blocked = app
        .request("DELETE", &format!("/api/categories/{a}"), None, Some(&admin))
        .await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        blocked.message(),
        "Cannot delete category with subcategories. Delete or reassign subcategories first."
    );

    let child = app
        .request("DELETE", &format!("/api/categories/{b}"), None, Some(&admin))
        .await;
    assert_eq!(child.status, StatusCode::OK);
    assert!(child.data().is_null());

    let parent = app
        .request("DELETE", &format!("/api/categories/{a}"), None, Some(&admin))
        .await;
    assert_eq!(parent.status, StatusCode::OK);

    let tree = app.request("GET", "/api/categories", None, None).await;
    assert!(tree.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_detail_lists_subcategories_and_ancestors() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let a = app.create_category(&admin, "Apparel", None).await;
    let b = app.create_category(&admin, "Tops", Some(&a)).await;
    let c = app.create_category(&admin, "Shirts", Some(&b)).await;

    let detail = app
        .request("GET", &format!("/api/categories/{b}"), None, None)
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.data()["name"], "Tops");
    assert_eq!(detail.data()["parent"], a.as_str());
    assert_eq!(detail.data()["subcategories"][0]["id"], c.as_str());
    assert_eq!(detail.data()["ancestors"].as_array().unwrap().len(), 1);
    assert_eq!(detail.data()["ancestors"][0]["id"], a.as_str());
}

#[tokio::test]
async fn test_parent_rules() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let a = app.create_category(&admin, "A", None).await;
    let b = app.create_category(&admin, "B", Some(&a)).await;

    let own_parent = app
        .request(
            "PUT",
            &format!("/api/categories/{a}"),
            Some(json!({ "parent": a })),
            Some(&admin),
        )
        .await;
    assert_eq!(own_parent.status, StatusCode::BAD_REQUEST);
    assert_eq!(own_parent.message(), "Category cannot be its own parent");

    let cycle = app
        .request(
            "PUT",
            &format!("/api/categories/{a}"),
            Some(json!({ "parent": b })),
            Some(&admin),
        )
        .await;
    assert_eq!(cycle.status, StatusCode::BAD_REQUEST);

    let detached = app
        .request(
            "PUT",
            &format!("/api/categories/{b}"),
            Some(json!({ "parent": null })),
            Some(&admin),
        )
        .await;
    assert_eq!(detached.status, StatusCode::OK);
    assert!(detached.data()["parent"].is_null());

    let missing_parent = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": "Orphan", "parent": "00000000-0000-0000-0000-000000000001" })),
            Some(&admin),
        )
        .await;
    assert_eq!(missing_parent.status, StatusCode::NOT_FOUND);
    assert_eq!(missing_parent.message(), "Parent category not found");
}

#[tokio::test]
async fn test_duplicate_name_and_products_block_delete() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let shirts = app.create_category(&admin, "Shirts", None).await;

    let duplicate = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": "Shirts" })),
            Some(&admin),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.message(), "Category with name 'Shirts' already exists");

    app.create_product(&admin, "Linen Shirt", &shirts, 40.0, &[])
        .await;
    let blocked = app
        .request("DELETE", &format!("/api/categories/{shirts}"), None, Some(&admin))
        .await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        blocked.message(),
        "Cannot delete category with associated products. Reassign or delete products first."
    );
}

#[tokio::test]
async fn test_category_writes_require_admin() {
    let app = TestApp::new();
    let user = app.register_user("shopper@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/categories",
            Some(json!({ "name": "Shirts" })),
            Some(&user),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
