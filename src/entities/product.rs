use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub category: Category,
    pub price: f32,
    pub original_price: Option<f32>,
    pub stock: u32,
    pub in_stock: bool,
    pub image_url: String,
    #[sea_orm(column_type = "Json")]
    pub thumbnails: UrlList,
    //cache of image_url + thumbnails, rebuilt on every write that touches either
    #[sea_orm(column_type = "Json")]
    pub images: UrlList,
    pub image: String,
    pub is_featured: bool,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    enum_name = "category_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum Category {
    #[sea_orm(string_value = "Electricals")]
    Electricals,
    #[sea_orm(string_value = "Furniture")]
    Furniture,
    #[sea_orm(string_value = "Appliances")]
    Appliances,
    #[sea_orm(string_value = "Lighting")]
    Lighting,
}

impl ToString for Category {
    fn to_string(&self) -> String {
        match self {
            Self::Electricals => "Electricals".to_string(),
            Self::Furniture => "Furniture".to_string(),
            Self::Appliances => "Appliances".to_string(),
            Self::Lighting => "Lighting".to_string(),
        }
    }
}

/// A JSON array of image URLs, stored as a single column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct UrlList(pub Vec<String>);

impl UrlList {
    pub fn empty() -> UrlList {
        UrlList(Vec::new())
    }
}

/// Rebuilds the denormalized `images` column: primary url first, then the
/// thumbnails, with empty entries dropped.
pub fn merged_images(image_url: &str, thumbnails: &[String]) -> UrlList {
    let mut urls = Vec::with_capacity(thumbnails.len() + 1);
    if !image_url.is_empty() {
        urls.push(image_url.to_owned());
    }
    for thumb in thumbnails {
        if !thumb.is_empty() {
            urls.push(thumb.clone());
        }
    }
    UrlList(urls)
}
