pub mod cart;
pub mod image;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;
pub mod wishlist;

use crate::entities::{
    cart::Entity as Cart, image::Entity as Image, order::Entity as Order,
    order_item::Entity as OrderItem, product::Entity as Product, user::Entity as User,
    wishlist::Entity as Wishlist,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Schema, Set,
};

pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_user_table = schema.create_table_from_entity(User);
    create_user_table.if_not_exists();
    db.execute(backend.build(&create_user_table)).await?;

    let mut create_product_table = schema.create_table_from_entity(Product);
    create_product_table.if_not_exists();
    db.execute(backend.build(&create_product_table)).await?;

    let mut create_order_table = schema.create_table_from_entity(Order);
    create_order_table.if_not_exists();
    db.execute(backend.build(&create_order_table)).await?;

    let mut create_order_item_table = schema.create_table_from_entity(OrderItem);
    create_order_item_table.if_not_exists();
    db.execute(backend.build(&create_order_item_table)).await?;

    let mut create_cart_table = schema.create_table_from_entity(Cart);
    create_cart_table.if_not_exists();
    db.execute(backend.build(&create_cart_table)).await?;

    let mut create_wishlist_table = schema.create_table_from_entity(Wishlist);
    create_wishlist_table.if_not_exists();
    db.execute(backend.build(&create_wishlist_table)).await?;

    let mut create_image_table = schema.create_table_from_entity(Image);
    create_image_table.if_not_exists();
    db.execute(backend.build(&create_image_table)).await?;

    Ok(())
}

//safe to call on every start, does nothing once the account exists
pub async fn seed_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<(), DbErr> {
    let existing = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| DbErr::Custom(format!("Failed to hash admin password: {}", err)))?
        .to_string();

    let new_admin = user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        ..Default::default()
    };
    User::insert(new_admin).exec(db).await?;

    Ok(())
}
