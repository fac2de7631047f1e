//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use catalog_api::{AppState, build_app};
use catalog_auth::{JwtEncoder, PasswordHasher, PasswordValidator};
use catalog_core::config::AppConfig;
use catalog_database::Store;
use catalog_entity::user::UserRole;
use catalog_service::AuthService;

/// Password that satisfies the default policy.
pub const PASSWORD: &str = "Secret123";

/// Test application context
pub struct TestApp {
    /// The full application router
    pub router: Router,
    /// The store behind the router, for direct assertions
    pub store: Store,
    /// Application config
    pub config: AppConfig,
}

/// Status and parsed JSON body of a response
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed body; `Null` for empty bodies
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `message` field of an envelope
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = Store::memory();
        let router = build_app(AppState::new(config.clone(), store.clone()));
        Self {
            router,
            store,
            config,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Register a regular user through the API and return their token
    pub async fn register_user(&self, email: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({ "name": "Test User", "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        token_of(&response)
    }

    /// Provision an admin account directly and sign in through the API
    pub async fn admin_token(&self) -> String {
        let auth = AuthService::new(
            self.store.users.clone(),
            PasswordHasher::new(),
            PasswordValidator::new(&self.config.auth),
            JwtEncoder::new(&self.config.auth),
        );
        auth.create_user("Admin", "admin@example.com", PASSWORD, UserRole::Admin)
            .await
            .expect("Failed to create admin");
        self.login("admin@example.com", PASSWORD).await
    }

    /// Login and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "Login failed: {:?}", response.body);
        token_of(&response)
    }

    /// Create a category and return its id
    pub async fn create_category(&self, token: &str, name: &str, parent: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/categories",
                Some(json!({ "name": name, "parent": parent })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        id_of(&response)
    }

    /// Create a product with one variant per `(sku, price, stock)` and return its id
    pub async fn create_product(
        &self,
        token: &str,
        name: &str,
        category: &str,
        base_price: f64,
        variants: &[(&str, f64, i64)],
    ) -> String {
        let variants: Vec<Value> = variants
            .iter()
            .map(|(sku, price, stock)| json!({ "sku": sku, "price": price, "stock": stock }))
            .collect();
        let response = self
            .request(
                "POST",
                "/api/products",
                Some(json!({
                    "name": name,
                    "description": format!("{name} for integration tests"),
                    "category": category,
                    "basePrice": base_price,
                    "variants": variants,
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        id_of(&response)
    }
}

fn token_of(response: &TestResponse) -> String {
    response.data()["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// The `data.id` of a response
pub fn id_of(response: &TestResponse) -> String {
    response.data()["id"]
        .as_str()
        .expect("No id in response")
        .to_string()
}
