use reqwest::{header, Client, StatusCode};
use serde_json::json;

mod common;
use common::{add_to_cart, admin_token, bearer, create_product, place_order, spawn_app, user_token};

async fn seed_product(base: &str, name: &str, price: f32) -> i64 {
    let token = admin_token(base).await;
    create_product(
        base,
        &token,
        json!({
            "name": name,
            "category": "Furniture",
            "price": price,
            "stock": 10
        }),
    )
    .await
}

//cart
#[tokio::test]
async fn test_cart_starts_empty() {
    let base = spawn_app().await;
    let client = Client::new();
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_cart_add_merges_repeated_products() {
    let base = spawn_app().await;
    let client = Client::new();
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    //same product again folds into the existing line
    let response = client
        .post(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product, "quantity": 3 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let entries = body.as_array().expect("Expected a cart array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["quantity"], 5);
    assert_eq!(entries[0]["name"], "Oak Coffee Table");
    assert_eq!(entries[0]["product_id"], product);
}

#[tokio::test]
async fn test_cart_rejects_bad_additions() {
    let base = spawn_app().await;
    let client = Client::new();
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product, "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": 4242, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_patch_and_remove() {
    let base = spawn_app().await;
    let client = Client::new();
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, product, 4).await;

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let entry_id = body[0]["id"].as_i64().expect("Entry id missing");

    let response = client
        .patch(format!("{}/api/cart/{}", base, entry_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body[0]["quantity"], 1);

    //quantity zero empties the line
    let response = client
        .patch(format!("{}/api/cart/{}", base, entry_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));

    let response = client
        .patch(format!("{}/api/cart/{}", base, entry_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_delete_and_clear() {
    let base = spawn_app().await;
    let client = Client::new();
    let table = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let lamp = seed_product(&base, "Floor Lamp", 79.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, table, 1).await;
    add_to_cart(&base, &token, lamp, 2).await;

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let entry_id = body[0]["id"].as_i64().expect("Entry id missing");

    let response = client
        .delete(format!("{}/api/cart/{}", base, entry_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body.as_array().expect("Expected a cart array").len(), 1);

    let response = client
        .delete(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));
}

//wishlist
#[tokio::test]
async fn test_wishlist_add_is_idempotent() {
    let base = spawn_app().await;
    let client = Client::new();
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/wishlist", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/wishlist", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/wishlist", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let entries = body.as_array().expect("Expected a wishlist array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Oak Coffee Table");
    assert_eq!(entries[0]["product_id"], product);
}

#[tokio::test]
async fn test_wishlist_remove_by_product() {
    let base = spawn_app().await;
    let client = Client::new();
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/wishlist", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": product }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .delete(format!("{}/api/wishlist/{}", base, product))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    //a second removal has nothing left to target
    let response = client
        .delete(format!("{}/api/wishlist/{}", base, product))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_rejects_missing_product() {
    let base = spawn_app().await;
    let client = Client::new();
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/wishlist", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "product_id": 4242 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

//orders
#[tokio::test]
async fn test_checkout_turns_the_cart_into_an_order() {
    let base = spawn_app().await;
    let client = Client::new();
    let table = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let lamp = seed_product(&base, "Floor Lamp", 79.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, table, 1).await;
    add_to_cart(&base, &token, lamp, 2).await;

    let order_id = place_order(&base, &token).await;

    //the cart was spent by the checkout
    let response = client
        .get(format!("{}/api/cart", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));

    let response = client
        .get(format!("{}/api/order/{}", base, order_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["id"], order_id);
    assert_eq!(body["status"], "placed");
    let items = body["items"].as_array().expect("Expected an item array");
    assert_eq!(items.len(), 2);
    assert!(items.iter().any(|item| {
        item["name"] == "Oak Coffee Table" && item["quantity"] == 1
    }));
    assert!(items.iter().any(|item| {
        item["name"] == "Floor Lamp" && item["quantity"] == 2
    }));
}

#[tokio::test]
async fn test_checkout_rejects_an_empty_cart() {
    let base = spawn_app().await;
    let client = Client::new();
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    let response = client
        .post(format!("{}/api/order", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["error"], "Cart is empty");
}

#[tokio::test]
async fn test_orders_newest_first_and_private() {
    let base = spawn_app().await;
    let client = Client::new();
    let table = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;
    let other = user_token(&base, "JaneDoe", "Muzion15").await;

    add_to_cart(&base, &token, table, 1).await;
    let first = place_order(&base, &token).await;
    add_to_cart(&base, &token, table, 2).await;
    let second = place_order(&base, &token).await;

    let response = client
        .get(format!("{}/api/order", base))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let orders = body.as_array().expect("Expected an order array");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second);
    assert_eq!(orders[1]["id"], first);

    //someone else's order stays invisible
    let response = client
        .get(format!("{}/api/order/{}", base, first))
        .header(header::AUTHORIZATION, bearer(&other))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(format!("{}/api/order", base))
        .header(header::AUTHORIZATION, bearer(&other))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_order_lines_outlive_their_product() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = admin_token(&base).await;
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, product, 2).await;
    let order_id = place_order(&base, &token).await;

    let response = client
        .delete(format!("{}/api/admin/product/{}", base, product))
        .header(header::AUTHORIZATION, bearer(&admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/order/{}", base, order_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let items = body["items"].as_array().expect("Expected an item array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], product);
    //the name died with the product, the line itself survives
    assert!(items[0]["name"].is_null());
    assert_eq!(items[0]["quantity"], 2);
}

//admin order management
#[tokio::test]
async fn test_admin_lists_filters_and_advances_orders() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = admin_token(&base).await;
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, product, 1).await;
    let order_id = place_order(&base, &token).await;

    let response = client
        .get(format!("{}/api/admin/order", base))
        .header(header::AUTHORIZATION, bearer(&admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let orders = body.as_array().expect("Expected an order array");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], order_id);
    assert_eq!(orders[0]["username"], "JohnDoe");
    assert_eq!(orders[0]["status"], "placed");
    assert_eq!(orders[0]["items"][0]["name"], "Oak Coffee Table");

    let response = client
        .patch(format!("{}/api/admin/order/{}", base, order_id))
        .header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    //the filter follows the new status
    let response = client
        .get(format!("{}/api/admin/order?status=placed", base))
        .header(header::AUTHORIZATION, bearer(&admin))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, json!([]));

    let response = client
        .get(format!("{}/api/admin/order?status=shipped", base))
        .header(header::AUTHORIZATION, bearer(&admin))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body.as_array().expect("Expected an order array").len(), 1);

    //the customer sees the updated status too
    let response = client
        .get(format!("{}/api/order/{}", base, order_id))
        .header(header::AUTHORIZATION, bearer(&token))
        .send()
        .await
        .expect("Failed to send request");
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body["status"], "shipped");
}

#[tokio::test]
async fn test_admin_rejects_unknown_status() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = admin_token(&base).await;
    let product = seed_product(&base, "Oak Coffee Table", 149.99).await;
    let token = user_token(&base, "JohnDoe", "Muzion15").await;

    add_to_cart(&base, &token, product, 1).await;
    let order_id = place_order(&base, &token).await;

    let response = client
        .patch(format!("{}/api/admin/order/{}", base, order_id))
        .header(header::AUTHORIZATION, bearer(&admin))
        .json(&json!({ "status": "teleported" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
