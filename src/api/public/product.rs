use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::stream::{self, Stream};
use sea_orm::{
    prelude::DateTimeUtc, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::error;

use crate::api::feed::ProductFeed;
use crate::catalog::featured::featured_products;
use crate::catalog::ranking::{top_selling_products, BEST_SELLERS_SHELF_SIZE};
use crate::catalog::search::search_products;
use crate::entities::product::{self, Category, Entity as ProductEntity};

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>, feed: ProductFeed) -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/featured", get(get_featured))
        .route("/product/bestsellers", get(get_bestsellers))
        .route("/product/search", get(search_catalogue))
        .route("/product/live", get(live_products))
        .route("/product/:id", get(get_product))
        .layer(Extension(db))
        .layer(Extension(feed))
}

//ROUTES
async fn get_products(
    Query(params): Query<GetProductsQuery>,
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

    if Some(true) == params.featured {
        finder = finder.filter(product::Column::IsFeatured.eq(true));
    }

    if let Some(min) = params.min {
        finder = finder.filter(product::Column::Price.gte(min));
    }

    if let Some(max) = params.max {
        finder = finder.filter(product::Column::Price.lte(max));
    }

    let order = params.order.unwrap_or(ProductOrder::CreatedAt);
    let result = apply_order(finder, order).all(&txn).await;
    match result {
        Ok(products) => {
            let response: Vec<PublicProductResponse> = products
                .into_iter()
                .map(|prod| PublicProductResponse::new(prod))
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

async fn get_product(
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

    let result = ProductEntity::find_by_id(id).one(&txn).await;
    match result {
        Ok(Some(prod)) => (StatusCode::OK, Json(PublicProductResponse::new(prod))).into_response(),
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

async fn get_featured(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let products = featured_products(&*db).await;
    let response: Vec<PublicProductResponse> = products
        .into_iter()
        .map(|prod| PublicProductResponse::new(prod))
        .collect();
    (StatusCode::OK, Json(response))
}

async fn get_bestsellers(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    let shelf = top_selling_products(&*db, BEST_SELLERS_SHELF_SIZE).await;
    let response: Vec<BestSellerResponse> = shelf
        .into_iter()
        .map(|(prod, sold)| BestSellerResponse::new(prod, sold))
        .collect();
    (StatusCode::OK, Json(response))
}

async fn search_catalogue(
    Query(params): Query<SearchQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    match search_products(&*db, &query, params.limit).await {
        Ok(products) => {
            let response: Vec<PublicProductResponse> = products
                .into_iter()
                .map(|prod| PublicProductResponse::new(prod))
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

/// Server-sent events. Emits the full catalogue once on connect, then again
/// after every product write, under the requested ordering. Whatever arrives
/// last replaces everything the client holds.
async fn live_products(
    Query(params): Query<LiveQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(feed): Extension<ProductFeed>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let order = params.order.unwrap_or(ProductOrder::CreatedAt);
    let subscription = feed.subscribe();

    let stream = stream::unfold(
        (db, subscription, order, true),
        |(db, mut subscription, order, first)| async move {
            if !first && subscription.changed().await.is_err() {
                return None;
            }
            let snapshot = live_snapshot(&db, order).await;
            let event = match Event::default().event("products").json_data(&snapshot) {
                Ok(event) => event,
                Err(_) => Event::default().event("products").data("[]"),
            };
            Some((Ok(event), (db, subscription, order, false)))
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn live_snapshot(db: &DatabaseConnection, order: ProductOrder) -> Vec<PublicProductResponse> {
    let result = apply_order(ProductEntity::find(), order).all(db).await;
    match result {
        Ok(products) => products
            .into_iter()
            .map(|prod| PublicProductResponse::new(prod))
            .collect(),
        Err(err) => {
            error!("Failed to refresh the live product feed: {}", err);
            Vec::new()
        }
    }
}

fn apply_order(finder: Select<ProductEntity>, order: ProductOrder) -> Select<ProductEntity> {
    match order {
        ProductOrder::CreatedAt => finder
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id),
        ProductOrder::Name => finder.order_by_asc(product::Column::Name),
        ProductOrder::Price => finder
            .order_by_asc(product::Column::Price)
            .order_by_asc(product::Column::Id),
    }
}

//Structs
#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum ProductOrder {
    CreatedAt,
    Name,
    Price,
}

#[derive(Deserialize)]
struct GetProductsQuery {
    category: Option<Category>,
    featured: Option<bool>,
    min: Option<f32>,
    max: Option<f32>,
    order: Option<ProductOrder>,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct LiveQuery {
    order: Option<ProductOrder>,
}

#[derive(Serialize)]
struct PublicProductResponse {
    id: i32,
    name: String,
    category: String,
    price: f32,
    original_price: Option<f32>,
    in_stock: bool,
    image: String,
    image_url: String,
    thumbnails: Vec<String>,
    images: Vec<String>,
    is_featured: bool,
    description: String,
    created_at: DateTimeUtc,
}

impl PublicProductResponse {
    fn new(value: product::Model) -> PublicProductResponse {
        PublicProductResponse {
            id: value.id,
            name: value.name,
            category: value.category.to_string(),
            price: value.price,
            original_price: value.original_price,
            in_stock: value.in_stock,
            image: value.image,
            image_url: value.image_url,
            thumbnails: value.thumbnails.0,
            images: value.images.0,
            is_featured: value.is_featured,
            description: value.description,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize)]
struct BestSellerResponse {
    id: i32,
    name: String,
    category: String,
    price: f32,
    original_price: Option<f32>,
    in_stock: bool,
    image: String,
    image_url: String,
    sales_count: u64,
}

impl BestSellerResponse {
    fn new(value: product::Model, sales_count: u64) -> BestSellerResponse {
        BestSellerResponse {
            id: value.id,
            name: value.name,
            category: value.category.to_string(),
            price: value.price,
            original_price: value.original_price,
            in_stock: value.in_stock,
            image: value.image,
            image_url: value.image_url,
            sales_count,
        }
    }
}
