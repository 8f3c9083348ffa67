use crate::entities::product;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder};

/// Case-insensitive substring search over name, description and category.
/// Queries shorter than two characters match nothing so a single keystroke
/// never floods the storefront dropdown with the whole catalogue.
pub async fn search_products<C>(
    db: &C,
    raw_query: &str,
    limit: Option<usize>,
) -> Result<Vec<product::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let needle = match normalize_query(raw_query) {
        Some(needle) => needle,
        None => return Ok(Vec::new()),
    };

    let snapshot = product::Entity::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await?;

    let mut found: Vec<product::Model> = snapshot
        .into_iter()
        .filter(|product| matches(product, &needle))
        .collect();
    if let Some(limit) = limit {
        found.truncate(limit);
    }
    Ok(found)
}

pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < 2 {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn matches(product: &product::Model, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_string().to_lowercase().contains(needle)
}
