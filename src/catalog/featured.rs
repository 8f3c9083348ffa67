use crate::catalog::samples::sample_products;
use crate::entities::product;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::error;

pub const FEATURED_SHELF_SIZE: u64 = 8;

/// The newest featured products, or the sample shelf when nothing has been
/// flagged yet. The storefront hero always has something to show, so a
/// database failure also falls back to the samples.
pub async fn featured_products<C>(db: &C) -> Vec<product::Model>
where
    C: ConnectionTrait,
{
    let loaded = product::Entity::find()
        .filter(product::Column::IsFeatured.eq(true))
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .limit(FEATURED_SHELF_SIZE)
        .all(db)
        .await;

    match loaded {
        Ok(models) if !models.is_empty() => models,
        Ok(_) => sample_products(),
        Err(err) => {
            error!("Failed to load featured products, serving samples: {}", err);
            sample_products()
        }
    }
}
