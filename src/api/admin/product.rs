use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::feed::ProductFeed;
use crate::entities::{
    cart,
    product::{self, merged_images, Category, Entity as ProductEntity, UrlList},
    wishlist,
};

//ROUTERS
pub fn admin_product_router(db: Arc<DatabaseConnection>, feed: ProductFeed) -> Router {
    Router::new()
        .route("/product", get(get_products).post(create_product))
        .route(
            "/product/:id",
            get(admin_get_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .layer(Extension(db))
        .layer(Extension(feed))
}

//ROUTES
async fn get_products(
    Query(params): Query<AdminProductsQuery>,
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

    let mut finder = ProductEntity::find();

    if let Some(category) = params.category {
        finder = finder.filter(product::Column::Category.eq(category));
    }

    if let Some(query) = params.query {
        let mut query_condition =
            Condition::any().add(product::Column::Name.contains(query.clone()));
        let id_search = query.parse::<u32>().ok();
        if let Some(id) = id_search {
            query_condition = query_condition.add(product::Column::Id.eq(id));
        }

        finder = finder.filter(query_condition);
    }

    finder = match params.order.as_deref() {
        Some("name") => finder.order_by_asc(product::Column::Name),
        Some("price") => finder.order_by_asc(product::Column::Price),
        _ => finder
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id),
    };

    match finder.all(&txn).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

async fn admin_get_product(
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => (StatusCode::OK, Json(prod)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No product with {} id was found", id)
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(feed): Extension<ProductFeed>,
    Json(payload): Json<CreateProduct>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid product payload"
            })),
        );
    }

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

    let thumbnails = payload.thumbnails.unwrap_or_default();
    let image_url = payload.image_url.unwrap_or_default();
    let stock = payload.stock.unwrap_or(0);
    //an explicit flag wins, otherwise any stock counts as purchasable
    let in_stock = payload.in_stock.unwrap_or(stock > 0);

    let new_product = product::ActiveModel {
        name: Set(payload.name),
        category: Set(payload.category),
        price: Set(payload.price),
        original_price: Set(payload.original_price),
        stock: Set(stock),
        in_stock: Set(in_stock),
        image_url: Set(image_url.clone()),
        thumbnails: Set(UrlList(thumbnails.clone())),
        images: Set(merged_images(&image_url, &thumbnails)),
        image: Set(payload.image.unwrap_or_default()),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        description: Set(payload.description.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match ProductEntity::insert(new_product).exec(&txn).await {
        Ok(result) => match txn.commit().await {
            Ok(_) => {
                feed.publish();
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "Product created successfully",
                        "id": result.last_insert_id
                    })),
                )
            }
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
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Product already exists"
                })),
            )
        }
    }
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(feed): Extension<ProductFeed>,
    Json(payload): Json<PatchProductPayload>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid product payload"
            })),
        );
    }

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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(existing)) => {
            let mut image_url = existing.image_url.clone();
            let mut thumbnails = existing.thumbnails.clone();
            let mut prod: product::ActiveModel = existing.into();

            if let Some(name) = payload.name {
                prod.name = Set(name);
            }

            if let Some(category) = payload.category {
                prod.category = Set(category);
            }

            if let Some(price) = payload.price {
                prod.price = Set(price);
            }

            if let Some(original_price) = payload.original_price {
                prod.original_price = Set(Some(original_price));
            }

            if let Some(stock) = payload.stock {
                prod.stock = Set(stock);
                prod.in_stock = Set(stock > 0);
            }

            //an explicit flag wins over the stock rule above
            if let Some(in_stock) = payload.in_stock {
                prod.in_stock = Set(in_stock);
            }

            if let Some(new_image_url) = payload.image_url {
                image_url = new_image_url;
                prod.image_url = Set(image_url.clone());
            }

            if let Some(new_thumbnails) = payload.thumbnails {
                thumbnails = UrlList(new_thumbnails);
                prod.thumbnails = Set(thumbnails.clone());
            }

            prod.images = Set(merged_images(&image_url, &thumbnails.0));

            if let Some(image) = payload.image {
                prod.image = Set(image);
            }

            if let Some(is_featured) = payload.is_featured {
                prod.is_featured = Set(is_featured);
            }

            if let Some(description) = payload.description {
                prod.description = Set(description);
            }

            match prod.update(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => {
                        feed.publish();
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": "Resource patched successfully"
                            })),
                        )
                    }
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
                "error": format!("No product with {} id was found", id)
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

/// Order lines survive on purpose, their product reference just goes stale.
/// Cart and wishlist rows do not, they are scrubbed in the same transaction.
async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(feed): Extension<ProductFeed>,
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

    match ProductEntity::find_by_id(id).one(&txn).await {
        Ok(Some(prod)) => {
            if cart::Entity::delete_many()
                .filter(cart::Column::ProductId.eq(id))
                .exec(&txn)
                .await
                .is_err()
            {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                );
            }

            if wishlist::Entity::delete_many()
                .filter(wishlist::Column::ProductId.eq(id))
                .exec(&txn)
                .await
                .is_err()
            {
                let _ = txn.rollback().await;
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                );
            }

            let prod: product::ActiveModel = prod.into();
            match prod.delete(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => {
                        feed.publish();
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": "Resource deleted successfully"
                            })),
                        )
                    }
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
                            "error": "Failed to delete this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No product with {} id was found", id)
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

//Structs
#[derive(Deserialize, Clone, Debug, Validate)]
struct CreateProduct {
    #[validate(length(min = 1, max = 120))]
    name: String,
    category: Category,
    #[validate(range(min = 0.0))]
    price: f32,
    #[validate(range(min = 0.0))]
    original_price: Option<f32>,
    stock: Option<u32>,
    in_stock: Option<bool>,
    image_url: Option<String>,
    #[validate(length(max = 5))]
    thumbnails: Option<Vec<String>>,
    image: Option<String>,
    is_featured: Option<bool>,
    description: Option<String>,
}

#[derive(Deserialize, Validate)]
struct PatchProductPayload {
    #[validate(length(min = 1, max = 120))]
    name: Option<String>,
    category: Option<Category>,
    #[validate(range(min = 0.0))]
    price: Option<f32>,
    #[validate(range(min = 0.0))]
    original_price: Option<f32>,
    stock: Option<u32>,
    in_stock: Option<bool>,
    image_url: Option<String>,
    #[validate(length(max = 5))]
    thumbnails: Option<Vec<String>>,
    image: Option<String>,
    is_featured: Option<bool>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct AdminProductsQuery {
    query: Option<String>,
    category: Option<Category>,
    order: Option<String>,
}
