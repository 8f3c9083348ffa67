use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{
    cart::{self, Entity as CartEntity},
    product::{self, Entity as ProductEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn cart_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_product).delete(clear_cart))
        .route("/cart/:id", patch(patch_entry).delete(remove_product))
        .layer(Extension(db))
}

//ROUTES
async fn get_cart(
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

    match CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .find_also_related(ProductEntity)
        .all(&txn)
        .await
    {
        Ok(entries) => {
            let response: Vec<CartItemResponse> = entries
                .into_iter()
                .filter_map(|(entry, prod)| prod.map(|prod| CartItemResponse::new(entry, prod)))
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
    Json(payload): Json<AddProduct>,
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
            if payload.quantity > 0 {
                if let Ok(Some(entry)) = CartEntity::find()
                    .filter(cart::Column::ProductId.eq(payload.product_id))
                    .filter(cart::Column::UserId.eq(user_id))
                    .one(&txn)
                    .await
                {
                    let quantity = entry.quantity;
                    let mut entry: cart::ActiveModel = entry.into();
                    entry.quantity = Set(quantity + payload.quantity);
                    let result = entry.update(&txn).await.map(|_| ());
                    match result {
                        Ok(_) => {
                            let _ = txn.commit().await;
                            return (
                                StatusCode::OK,
                                Json(json!({
                                    "message": "Resource patched successfully"
                                })),
                            );
                        }
                        Err(_) => {
                            let _ = txn.rollback().await;
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(json!({
                                    "error": "Failed to patch this resource"
                                })),
                            );
                        }
                    };
                };
                let new_entry = cart::ActiveModel {
                    user_id: Set(user_id),
                    product_id: Set(payload.product_id),
                    quantity: Set(payload.quantity),
                    ..Default::default()
                };
                match CartEntity::insert(new_entry).exec(&txn).await {
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
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Quantity should be greater than 0"
                    })),
                )
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
    Path(id): Path<i32>,
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

    match CartEntity::find_by_id(id)
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let entry: cart::ActiveModel = entry.into();
            let result = entry.delete(&txn).await;
            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to delete this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No related entry with {} id was found", id)
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

async fn patch_entry(
    Path(id): Path<i32>,
    Extension(claims): Extension<Claims>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchCart>,
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

    match CartEntity::find_by_id(id)
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let mut entry: cart::ActiveModel = entry.into();

            let result: Result<(), DbErr> = match payload.quantity {
                //zero empties the line out of the cart
                0 => entry.delete(&txn).await.map(|_| ()),
                _ => {
                    entry.quantity = Set(payload.quantity);
                    entry.update(&txn).await.map(|_| ())
                }
            };
            match result {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to patch this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No related entry with {} id was found", id)
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

async fn clear_cart(
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
            );
        }
    };

    match CartEntity::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(&txn)
        .await
    {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "message": "Cart cleared"
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

//Structs
#[derive(Deserialize, Debug)]
struct AddProduct {
    product_id: i32,
    quantity: u32,
}

#[derive(Deserialize)]
struct PatchCart {
    quantity: u32,
}

#[derive(Serialize)]
struct CartItemResponse {
    id: i32,
    product_id: i32,
    name: String,
    price: f32,
    image: String,
    image_url: String,
    in_stock: bool,
    quantity: u32,
}

impl CartItemResponse {
    fn new(entry: cart::Model, prod: product::Model) -> CartItemResponse {
        CartItemResponse {
            id: entry.id,
            product_id: prod.id,
            name: prod.name,
            price: prod.price,
            image: prod.image,
            image_url: prod.image_url,
            in_stock: prod.in_stock,
            quantity: entry.quantity,
        }
    }
}
