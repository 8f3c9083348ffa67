use axum::{
    extract::{DefaultBodyLimit, Extension, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::api::public::image::uploads_dir;
use crate::entities::image::{self, Entity as ImageEntity, FileExtension};

//ROUTERS
pub fn admin_image_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/image", post(upload).get(get_images))
        .route("/image/:id", delete(delete_image))
        .layer(DefaultBodyLimit::max(get_file_size_limit() + 1024 * 1024))
        .layer(Extension(db))
}

//ROUTES
async fn upload(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<serde_json::Value>) {
    let field = match multipart.next_field().await.unwrap_or(None) {
        Some(field) => field,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Expected a single file field"
                })),
            );
        }
    };

    let content_type = match field.content_type() {
        Some(content_type) => content_type.to_owned(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Content type is not set"
                })),
            );
        }
    };

    let file_extension = match allowed_content_types().get(content_type.as_str()) {
        Some(&ext) => ext,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Unsupported content type"
                })),
            );
        }
    };

    let file_name = match field.name() {
        Some(name) => name.to_owned(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "File name is not set"
                })),
            );
        }
    };

    if !FILE_NAME_REGEX.is_match(&file_name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid file name. It should contain only Latin letters, numbers, '-', or '_'."
            })),
        );
    }

    let data = match field.bytes().await {
        Ok(data) => data,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to read file bytes"
                })),
            );
        }
    };
    if data.len() > get_file_size_limit() {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({
                "error": "Payload too large"
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

    let id = Uuid::new_v4().to_string();
    let new_image = image::ActiveModel {
        file_name: Set(file_name),
        path_name: Set(id.clone()),
        extension: Set(file_extension),
        ..Default::default()
    };

    let inserted = match ImageEntity::insert(new_image).exec(&txn).await {
        Ok(result) => result.last_insert_id,
        Err(_) => {
            let _ = txn.rollback().await;
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Image already exists"
                })),
            );
        }
    };

    match tokio_fs::write(
        format!("{}/{}.{}", uploads_dir(), id, file_extension.to_string()),
        data,
    )
    .await
    {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "File uploaded successfully",
                    "id": inserted,
                    "url": format!("/api/image/{}", inserted)
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
                    "error": "Failed to upload file to the server"
                })),
            )
        }
    }
}

async fn get_images(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Query(query): Query<ImagesQuery>,
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

    let filter = if let Some(query) = query.query {
        let mut query_condition =
            Condition::any().add(image::Column::FileName.contains(query.clone()));
        let id_search = query.parse::<u32>().ok();
        if let Some(id) = id_search {
            query_condition = query_condition.add(image::Column::Id.eq(id));
        };

        query_condition
    } else {
        Condition::any()
    };

    let result = ImageEntity::find()
        .filter(filter)
        .order_by_desc(image::Column::Id)
        .all(&txn)
        .await;
    match result {
        Ok(images) => (StatusCode::OK, Json(images)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

async fn delete_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> (StatusCode, Json<serde_json::Value>) {
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

    match ImageEntity::find_by_id(id).one(&txn).await {
        Ok(Some(image)) => {
            let path = format!(
                "{}/{}.{}",
                uploads_dir(),
                image.path_name,
                image.extension.to_string()
            );

            let image: image::ActiveModel = image.into();
            match image.delete(&txn).await {
                Ok(_) => {
                    match tokio_fs::remove_file(&path).await {
                        Ok(_) => {}
                        //already gone from disk, the row is what matters
                        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                        Err(_) => {
                            let _ = txn.rollback().await;
                            return (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Json(json!({
                                    "error": "Failed to delete this resource"
                                })),
                            );
                        }
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
                "error": format!("No image with {} id was found", id)
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

//structs
#[derive(Deserialize)]
struct ImagesQuery {
    query: Option<String>,
}

//utils
fn allowed_content_types() -> HashMap<&'static str, FileExtension> {
    HashMap::from([
        ("image/jpeg", FileExtension::JPG),
        ("image/png", FileExtension::PNG),
        ("image/webp", FileExtension::WEBP),
    ])
}

static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,40}$").unwrap());

fn get_file_size_limit() -> usize {
    dotenv().ok();
    std::env::var("FILE_SIZE_LIMIT")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(5 * 1024 * 1024)
}
