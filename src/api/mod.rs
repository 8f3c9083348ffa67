pub mod admin;
pub mod feed;
pub mod public;
pub mod user;

use axum::{
    http::{header, Method},
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::logging::logging_middleware;
use admin::admin_api_router;
use feed::ProductFeed;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, feed: ProductFeed) -> Router {
    Router::new()
        .nest("/api", public_api_router(shared_db.clone(), feed.clone()))
        .nest("/api", user_api_router(shared_db.clone()))
        .nest("/api/admin", admin_api_router(shared_db.clone(), feed))
        .route("/health", get(health))
        .layer(from_fn(logging_middleware))
        .layer(build_cors())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
