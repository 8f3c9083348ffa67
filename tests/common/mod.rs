#![allow(dead_code)]

use reqwest::{header, Client};
use sea_orm::{ConnectOptions, Database};
use serde_json::json;
use std::sync::Arc;
use std::sync::Once;

use homeware_store::api::create_api_router;
use homeware_store::api::feed::ProductFeed;
use homeware_store::entities::{seed_admin, setup_schema};

static ENV: Once = Once::new();

fn init_env() {
    ENV.call_once(|| {
        std::env::set_var("SECRET", "integration-test-secret");
        let uploads =
            std::env::temp_dir().join(format!("homeware-store-tests-{}", std::process::id()));
        std::fs::create_dir_all(&uploads).expect("Failed to create the test uploads directory");
        std::env::set_var(
            "UPLOADS_DIR",
            uploads.to_str().expect("Uploads path is not valid UTF-8"),
        );
    });
}

/// Boots the whole app on an ephemeral port with its own in-memory database
/// and returns the base URL. Every test gets a clean world.
pub async fn spawn_app() -> String {
    init_env();

    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    //one pooled connection, otherwise every connection opens its own empty database
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to the test database");
    setup_schema(&db)
        .await
        .expect("Failed to create the schema");
    seed_admin(&db, "admin", "Secret15")
        .await
        .expect("Failed to seed the admin account");

    let app = create_api_router(Arc::new(db), ProductFeed::new());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind a test listener");
    let addr = listener
        .local_addr()
        .expect("Failed to read the listener address");
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Test server crashed");
    });

    format!("http://{}", addr)
}

pub async fn admin_token(base: &str) -> String {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/login", base))
        .json(&json!({
            "username": "admin",
            "password": "Secret15"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["token"]
        .as_str()
        .expect("Token missing from the login response")
        .to_string()
}

/// Registers a fresh user and logs them in.
pub async fn user_token(base: &str, username: &str, password: &str) -> String {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/register", base))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/login", base))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["token"]
        .as_str()
        .expect("Token missing from the login response")
        .to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub async fn create_product(base: &str, token: &str, payload: serde_json::Value) -> i64 {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/admin/product", base))
        .header(header::AUTHORIZATION, bearer(token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["id"]
        .as_i64()
        .expect("Id missing from the create response")
}

pub async fn add_to_cart(base: &str, token: &str, product_id: i64, quantity: u32) {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(token))
        .json(&json!({
            "product_id": product_id,
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(
        response.status() == reqwest::StatusCode::CREATED
            || response.status() == reqwest::StatusCode::OK
    );
}

/// Empties the cart into a new order and returns the order id.
pub async fn place_order(base: &str, token: &str) -> i64 {
    let client = Client::new();
    let response = client
        .post(format!("{}/api/order", base))
        .header(header::AUTHORIZATION, bearer(token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["id"]
        .as_i64()
        .expect("Id missing from the order response")
}
