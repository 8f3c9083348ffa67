pub mod image;
pub mod order;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use image::admin_image_router;
use order::admin_order_router;
use product::admin_product_router;

use crate::api::feed::ProductFeed;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};

pub fn admin_api_router(db: Arc<DatabaseConnection>, feed: ProductFeed) -> Router {
    let admin_product_router = admin_product_router(db.clone(), feed);
    let admin_order_router = admin_order_router(db.clone());
    let admin_image_router = admin_image_router(db.clone());

    Router::new()
        .nest("/", admin_product_router)
        .nest("/", admin_order_router)
        .nest("/", admin_image_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
