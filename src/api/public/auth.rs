use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{extract::Extension, http::StatusCode, routing::post, Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::auth::generate_token;

//ROUTERS
pub fn auth_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .layer(Extension(db))
}

//ROUTES
async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Username must be 3-25 letters, digits or '_', password at least 8 characters"
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

    let password = match hash_password(&payload.password) {
        Ok(password) => password,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        role: Set(Role::User),
        ..Default::default()
    };

    match UserEntity::insert(new_user).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "User registered successfully"
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
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Username already exists"
                })),
            )
        }
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
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

    let result = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(&txn)
        .await;

    match result {
        Ok(Some(model)) => match model.check_hash(&payload.password) {
            Ok(()) => match generate_token(model.id, model.role.to_string()).await {
                Ok(token) => (
                    StatusCode::OK,
                    Json(json!({
                        "token": token,
                        "role": model.role.to_string()
                    })),
                ),
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
            },
            Err(_) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Invalid username or password"
                })),
            ),
        },
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid username or password"
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
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

//structs
#[derive(Deserialize, Clone, Debug, Validate)]
struct RegisterPayload {
    #[validate(regex(path = *USERNAME_REGEX))]
    username: String,
    #[validate(length(min = 8))]
    password: String,
}

#[derive(Deserialize, Clone, Debug)]
struct LoginPayload {
    username: String,
    password: String,
}

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,25}$").unwrap());
