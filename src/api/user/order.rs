use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    prelude::DateTimeUtc, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    cart::{self, Entity as CartEntity},
    order::{self, Entity as OrderEntity},
    order_item::{self, Entity as OrderItemEntity},
    product::{self, Entity as ProductEntity},
};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_orders).post(place_order))
        .route("/order/:id", get(get_order))
        .layer(Extension(db))
}

//ROUTES
/// Turns the whole cart into an order. The cart is emptied in the same
/// transaction, so a failure leaves both untouched.
async fn place_order(
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

    let cart_entries = match CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .all(&txn)
        .await
    {
        Ok(entries) => entries,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    if cart_entries.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Cart is empty"
            })),
        );
    }

    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        status: Set(order::Status::Placed),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let order_id = match OrderEntity::insert(new_order).exec(&txn).await {
        Ok(result) => result.last_insert_id,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    let lines: Vec<order_item::ActiveModel> = cart_entries
        .iter()
        .map(|entry| order_item::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(Some(entry.product_id)),
            quantity: Set(Some(entry.quantity)),
            ..Default::default()
        })
        .collect();
    if let Err(_) = OrderItemEntity::insert_many(lines).exec(&txn).await {
        let _ = txn.rollback().await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        );
    }

    if let Err(_) = CartEntity::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        );
    }

    match txn.commit().await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Order placed successfully",
                "id": order_id
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

async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
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

    let orders = match OrderEntity::find()
        .filter(order::Column::UserId.eq(claims.user_id))
        .find_with_related(OrderItemEntity)
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(&txn)
        .await
    {
        Ok(orders) => orders,
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

    let all_items: Vec<order_item::Model> = orders
        .iter()
        .flat_map(|(_, items)| items.iter().cloned())
        .collect();
    let names = match resolve_names(&txn, &all_items).await {
        Ok(names) => names,
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

    let response: Vec<OrderResponse> = orders
        .into_iter()
        .map(|(order, items)| OrderResponse::new(order, build_items(items, &names)))
        .collect();
    (StatusCode::OK, Json(response)).into_response()
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
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

    let order = match OrderEntity::find_by_id(id)
        .filter(order::Column::UserId.eq(claims.user_id))
        .one(&txn)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found", id)
                })),
            )
                .into_response();
        }
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

    let items = match OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&txn)
        .await
    {
        Ok(items) => items,
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

    let names = match resolve_names(&txn, &items).await {
        Ok(names) => names,
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

    (
        StatusCode::OK,
        Json(OrderResponse::new(order, build_items(items, &names))),
    )
        .into_response()
}

//utilities
async fn resolve_names<C>(
    db: &C,
    items: &[order_item::Model],
) -> Result<HashMap<i32, String>, DbErr>
where
    C: ConnectionTrait,
{
    let mut ids: Vec<i32> = items.iter().filter_map(|item| item.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let products = ProductEntity::find()
        .filter(product::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(products
        .into_iter()
        .map(|prod| (prod.id, prod.name))
        .collect())
}

fn build_items(
    items: Vec<order_item::Model>,
    names: &HashMap<i32, String>,
) -> Vec<OrderItemResponse> {
    items
        .into_iter()
        .map(|item| OrderItemResponse {
            product_id: item.product_id,
            //None once the product has been deleted from the catalogue
            name: item.product_id.and_then(|id| names.get(&id).cloned()),
            quantity: item.quantity,
        })
        .collect()
}

//Structs
#[derive(Serialize)]
struct OrderResponse {
    id: i32,
    status: String,
    created_at: DateTimeUtc,
    items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    fn new(value: order::Model, items: Vec<OrderItemResponse>) -> OrderResponse {
        OrderResponse {
            id: value.id,
            status: value.status.to_string(),
            created_at: value.created_at,
            items,
        }
    }
}

#[derive(Serialize)]
struct OrderItemResponse {
    product_id: Option<i32>,
    name: Option<String>,
    quantity: Option<u32>,
}
