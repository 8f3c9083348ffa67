use axum::{
    extract::Extension, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn profile_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/profile", get(get_profile).patch(patch_profile))
        .layer(Extension(db))
}

//ROUTES
async fn get_profile(
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
        }
    };

    match UserEntity::find_by_id(user_id).one(&txn).await {
        Ok(Some(model)) => (
            StatusCode::OK,
            Json(json!({
                "id": model.id,
                "username": model.username,
                "role": model.role.to_string()
            })),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Not found"
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

async fn patch_profile(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchProfile>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Username must be 3-25 letters, digits or '_'"
            })),
        );
    }

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
        }
    };

    match UserEntity::find_by_id(user_id).one(&txn).await {
        Ok(Some(model)) => {
            let mut model: user::ActiveModel = model.into();
            model.username = Set(payload.username);
            let result = model.update(&txn).await.map(|_| ());
            match result {
                Ok(_) => match txn.commit().await {
                    Ok(_) => (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource patched successfully"
                        })),
                    ),
                    Err(_) => (
                        StatusCode::CONFLICT,
                        Json(json!({
                            "error": "This username is claimed"
                        })),
                    ),
                },
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::CONFLICT,
                        Json(json!({
                            "error": "This username is claimed"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Not found"
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
#[derive(Deserialize, Validate)]
struct PatchProfile {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: String,
}

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());
