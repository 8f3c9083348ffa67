use crate::entities::user::Entity as User;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub status: Status,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "User",
        from = "Column::UserId",
        to = "crate::entities::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "crate::entities::order_item::Entity")]
    OrderItem,
}

impl Related<crate::entities::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::entities::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    enum_name = "status_enum",
    db_type = "String(StringLen::N(255))",
    rs_type = "String"
)]
pub enum Status {
    #[sea_orm(string_value = "placed")]
    Placed,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
}

impl ToString for Status {
    fn to_string(&self) -> String {
        match self {
            Self::Placed => "placed".to_string(),
            Self::Processing => "processing".to_string(),
            Self::Shipped => "shipped".to_string(),
            Self::Delivered => "delivered".to_string(),
        }
    }
}
