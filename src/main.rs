use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use homeware_store::api::feed::ProductFeed;
use homeware_store::api::public::image::uploads_dir;
use homeware_store::api::create_api_router;
use homeware_store::entities::{seed_admin, setup_schema};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    //fail at boot rather than on the first login attempt
    std::env::var("SECRET").expect("SECRET must be set");

    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db)
        .await
        .expect("Failed to set up the database schema");

    let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Secret15".to_string());
    seed_admin(&db, &admin_username, &admin_password)
        .await
        .expect("Failed to seed the admin account");

    tokio::fs::create_dir_all(uploads_dir())
        .await
        .expect("Failed to create the uploads directory");

    let shared_db = Arc::new(db);
    let feed = ProductFeed::new();

    let app = create_api_router(shared_db, feed);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind the listener");
    tracing::info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await.expect("Server crashed");
}
