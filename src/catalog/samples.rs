use crate::entities::product::{self, Category, UrlList};
use chrono::{DateTime, Utc};

/// Placeholder shelf shown while the catalogue has nothing featured yet.
/// These are never written to the database.
pub fn sample_products() -> Vec<product::Model> {
    vec![
        sample(
            1,
            "Copper Pendant Light",
            Category::Lighting,
            49.99,
            Some(64.99),
            "💡",
            "Hand-finished copper shade on a braided flex.",
        ),
        sample(
            2,
            "Velvet Armchair",
            Category::Furniture,
            249.99,
            None,
            "🛋️",
            "Deep-seated armchair upholstered in forest green velvet.",
        ),
        sample(
            3,
            "Stand Mixer",
            Category::Appliances,
            189.99,
            Some(229.99),
            "🥣",
            "Five litre stand mixer with whisk, beater and dough hook.",
        ),
        sample(
            4,
            "Smart Dimmer Switch",
            Category::Electricals,
            22.49,
            None,
            "🔌",
            "App-controlled dimmer that fits a standard back box.",
        ),
        sample(
            5,
            "Oak Coffee Table",
            Category::Furniture,
            149.99,
            None,
            "🪵",
            "Solid oak table with a lower shelf for books.",
        ),
        sample(
            6,
            "Air Fryer",
            Category::Appliances,
            89.99,
            Some(109.99),
            "🍟",
            "Four litre air fryer with eight one-touch programmes.",
        ),
        sample(
            7,
            "Extension Reel",
            Category::Electricals,
            18.99,
            None,
            "⚡",
            "Ten metre four-socket reel with thermal cut-out.",
        ),
        sample(
            8,
            "Frosted Floor Lamp",
            Category::Lighting,
            79.99,
            None,
            "🏮",
            "Floor lamp with a frosted glass globe and brass stem.",
        ),
    ]
}

fn sample(
    id: i32,
    name: &str,
    category: Category,
    price: f32,
    original_price: Option<f32>,
    glyph: &str,
    description: &str,
) -> product::Model {
    product::Model {
        id,
        name: name.to_string(),
        category,
        price,
        original_price,
        stock: 10,
        in_stock: true,
        image_url: String::new(),
        thumbnails: UrlList::empty(),
        images: UrlList::empty(),
        image: glyph.to_string(),
        is_featured: true,
        description: description.to_string(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shelf_holds_eight_distinct_products() {
        let samples = sample_products();
        assert_eq!(samples.len(), 8);
        let ids: HashSet<i32> = samples.iter().map(|product| product.id).collect();
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn every_sample_is_featured_and_buyable() {
        for product in sample_products() {
            assert!(product.is_featured);
            assert!(product.in_stock);
            assert!(product.price > 0.0);
        }
    }
}
