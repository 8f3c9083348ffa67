use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    product::{self, Entity as ProductEntity},
    wishlist::{self, Entity as WishlistEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn wishlist_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/wishlist", get(get_wishlist).post(add_product))
        .route("/wishlist/:product_id", delete(remove_product))
        .layer(Extension(db))
}

//ROUTES
async fn get_wishlist(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    match WishlistEntity::find()
        .filter(wishlist::Column::UserId.eq(user_id))
        .find_also_related(ProductEntity)
        .all(&txn)
        .await
    {
        Ok(entries) => {
            let response: Vec<WishlistItemResponse> = entries
                .into_iter()
                .filter_map(|(entry, prod)| prod.map(|prod| WishlistItemResponse::new(entry, prod)))
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddToWishlist>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match ProductEntity::find_by_id(payload.product_id).one(&txn).await {
        Ok(Some(_)) => {
            match WishlistEntity::find()
                .filter(wishlist::Column::UserId.eq(user_id))
                .filter(wishlist::Column::ProductId.eq(payload.product_id))
                .one(&txn)
                .await
            {
                Ok(Some(_)) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Already in wishlist"
                    })),
                ),
                Ok(None) => {
                    let new_entry = wishlist::ActiveModel {
                        user_id: Set(user_id),
                        product_id: Set(payload.product_id),
                        ..Default::default()
                    };
                    match WishlistEntity::insert(new_entry).exec(&txn).await {
                        Ok(_) => match txn.commit().await {
                            Ok(_) => (
                                StatusCode::CREATED,
                                Json(json!({
                                    "message": "Added successfully"
                                })),
                            ),
                            Err(_) => (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "error": "Internal server error"
                                })),
                            ),
                        },
                        Err(_) => {
                            let _ = txn.rollback().await;
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "error": "Internal server error"
                                })),
                            )
                        }
                    }
                }
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
            }
        }
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("No product with {} id was found", payload.product_id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn remove_product(
    Path(product_id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let user_id = claims.user_id;
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match WishlistEntity::delete_many()
        .filter(wishlist::Column::UserId.eq(user_id))
        .filter(wishlist::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await
    {
        Ok(result) => {
            if result.rows_affected == 0 {
                let _ = txn.rollback().await;
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No product with {} id is in the wishlist", product_id)
                    })),
                );
            }
            match txn.commit().await {
                Ok(_) => (
                    StatusCode::OK,
                    Json(json!({
                        "message": "Resource deleted successfully"
                    })),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
            }
        }
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct AddToWishlist {
    product_id: i32,
}

#[derive(Serialize)]
struct WishlistItemResponse {
    id: i32,
    product_id: i32,
    name: String,
    price: f32,
    original_price: Option<f32>,
    image: String,
    image_url: String,
    in_stock: bool,
}

impl WishlistItemResponse {
    fn new(entry: wishlist::Model, prod: product::Model) -> WishlistItemResponse {
        WishlistItemResponse {
            id: entry.id,
            product_id: prod.id,
            name: prod.name,
            price: prod.price,
            original_price: prod.original_price,
            image: prod.image,
            image_url: prod.image_url,
            in_stock: prod.in_stock,
        }
    }
}
