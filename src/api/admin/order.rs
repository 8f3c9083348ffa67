use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    prelude::DateTimeUtc, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    order::{self, Entity as OrderEntity, Status},
    order_item::{self, Entity as OrderItemEntity},
    product::{self, Entity as ProductEntity},
    user::Entity as UserEntity,
};

//ROUTERS
pub fn admin_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order", get(get_orders))
        .route("/order/:id", get(admin_get_order).patch(patch_order))
        .layer(Extension(db))
}

//ROUTES
async fn get_orders(
    Query(params): Query<AdminOrdersQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
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

    let mut finder = OrderEntity::find();

    if let Some(status) = params.status {
        finder = finder.filter(order::Column::Status.eq(status));
    }

    if let Some(user_id) = params.user_id {
        finder = finder.filter(order::Column::UserId.eq(user_id));
    }

    let orders = match finder
        .find_also_related(UserEntity)
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

    let order_ids: Vec<i32> = orders.iter().map(|(order, _)| order.id).collect();
    let mut items_by_order: HashMap<i32, Vec<order_item::Model>> = HashMap::new();
    if !order_ids.is_empty() {
        let items = match OrderItemEntity::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
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
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
    }

    let all_items: Vec<order_item::Model> = items_by_order
        .values()
        .flat_map(|items| items.iter().cloned())
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

    let response: Vec<AdminOrderResponse> = orders
        .into_iter()
        .map(|(order, user)| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            AdminOrderResponse::new(order, user.map(|user| user.username), build_items(items, &names))
        })
        .collect();
    (StatusCode::OK, Json(response)).into_response()
}

async fn admin_get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
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

    let (order, user) = match OrderEntity::find_by_id(id)
        .find_also_related(UserEntity)
        .one(&txn)
        .await
    {
        Ok(Some(found)) => found,
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
        Json(AdminOrderResponse::new(
            order,
            user.map(|user| user.username),
            build_items(items, &names),
        )),
    )
        .into_response()
}

async fn patch_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchOrder>,
) -> impl IntoResponse {
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

    match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(order)) => {
            let mut order: order::ActiveModel = order.into();
            order.status = Set(payload.status);
            match order.update(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
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
                "error": format!("No order with {} id was found", id)
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
) -> Vec<AdminOrderItemResponse> {
    items
        .into_iter()
        .map(|item| AdminOrderItemResponse {
            product_id: item.product_id,
            name: item.product_id.and_then(|id| names.get(&id).cloned()),
            quantity: item.quantity,
        })
        .collect()
}

//Structs
#[derive(Deserialize)]
struct AdminOrdersQuery {
    status: Option<Status>,
    user_id: Option<i32>,
}

#[derive(Deserialize)]
struct PatchOrder {
    status: Status,
}

#[derive(Serialize)]
struct AdminOrderResponse {
    id: i32,
    user_id: i32,
    username: Option<String>,
    status: String,
    created_at: DateTimeUtc,
    items: Vec<AdminOrderItemResponse>,
}

impl AdminOrderResponse {
    fn new(
        value: order::Model,
        username: Option<String>,
        items: Vec<AdminOrderItemResponse>,
    ) -> AdminOrderResponse {
        AdminOrderResponse {
            id: value.id,
            user_id: value.user_id,
            username,
            status: value.status.to_string(),
            created_at: value.created_at,
            items,
        }
    }
}

#[derive(Serialize)]
struct AdminOrderItemResponse {
    product_id: Option<i32>,
    name: Option<String>,
    quantity: Option<u32>,
}
