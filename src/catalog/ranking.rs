use crate::entities::{order_item, product};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use std::collections::HashMap;
use tracing::error;

pub const BEST_SELLERS_SHELF_SIZE: u64 = 8;

/// Products ranked by units sold across every order line, paired with the
/// number sold. When fewer than `limit` products have ever sold, the shelf is
/// topped up with the newest products that have not sold yet.
///
/// The shelf is decoration, not data the caller depends on, so a database
/// failure comes back as an empty shelf rather than an error.
pub async fn top_selling_products<C>(db: &C, limit: u64) -> Vec<(product::Model, u64)>
where
    C: ConnectionTrait,
{
    let items = match order_item::Entity::find().all(db).await {
        Ok(items) => items,
        Err(err) => {
            error!("Failed to load order lines for the best sellers shelf: {}", err);
            return Vec::new();
        }
    };

    let mut shelf = Vec::new();
    let mut shelf_ids = Vec::new();
    for (product_id, sold) in rank(tally(&items)).into_iter().take(limit as usize) {
        match product::Entity::find_by_id(product_id).one(db).await {
            Ok(Some(model)) => {
                shelf_ids.push(model.id);
                shelf.push((model, sold));
            }
            //the product was deleted after it sold, its order lines stay behind
            Ok(None) => {}
            Err(err) => {
                error!("Failed to resolve product {} for the best sellers shelf: {}", product_id, err);
                return Vec::new();
            }
        }
    }

    if (shelf.len() as u64) < limit {
        let filler = product::Entity::find()
            .filter(product::Column::Id.is_not_in(shelf_ids))
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(limit - shelf.len() as u64)
            .all(db)
            .await;
        match filler {
            Ok(models) => {
                for model in models {
                    shelf.push((model, 0));
                }
            }
            Err(err) => {
                error!("Failed to top up the best sellers shelf: {}", err);
                return Vec::new();
            }
        }
    }

    shelf
}

/// Units sold per product. Lines without a product are skipped, lines without
/// a usable quantity count as a single unit.
pub fn tally(items: &[order_item::Model]) -> HashMap<i32, u64> {
    let mut totals = HashMap::new();
    for item in items {
        let product_id = match item.product_id {
            Some(id) => id,
            None => continue,
        };
        let sold = match item.quantity {
            Some(quantity) if quantity > 0 => quantity as u64,
            _ => 1,
        };
        *totals.entry(product_id).or_insert(0u64) += sold;
    }
    totals
}

/// Best sellers first, lowest product id first among equals.
pub fn rank(totals: HashMap<i32, u64>) -> Vec<(i32, u64)> {
    let mut ranked: Vec<(i32, u64)> = totals.into_iter().collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1).then(left.0.cmp(&right.0)));
    ranked
}
