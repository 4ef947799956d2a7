use std::collections::BTreeSet;

use crate::{dto::admin::InventoryStats, models::Product};

pub fn inventory_stats(products: &[Product], low_stock_threshold: i32) -> InventoryStats {
    let categories: BTreeSet<String> = products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();

    InventoryStats {
        total_products: products.len() as i64,
        total_stock_value: products
            .iter()
            .map(|p| p.price * i64::from(p.stock_quantity))
            .sum(),
        low_stock_count: products
            .iter()
            .filter(|p| p.stock_quantity > 0 && p.stock_quantity <= low_stock_threshold)
            .count() as i64,
        out_of_stock_count: products.iter().filter(|p| p.stock_quantity <= 0).count() as i64,
        low_stock_threshold,
        category_count: categories.len() as i64,
        categories: categories.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(price: i64, stock: i32, category: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Item".into(),
            brand: None,
            description: None,
            price,
            stock_quantity: stock,
            category: category.map(str::to_owned),
            image_url: None,
            sku: None,
            condition: "new".into(),
            weight: None,
            dimensions: None,
            owner_user_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn aggregates_value_and_stock_levels() {
        let products = vec![
            product(1_000, 20, Some("Books")),
            product(500, 3, Some("Games")),
            product(2_000, 0, Some("Books")),
            product(250, 10, None),
        ];
        let stats = inventory_stats(&products, 10);
        assert_eq!(stats.total_products, 4);
        assert_eq!(stats.total_stock_value, 20_000 + 1_500 + 2_500);
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.out_of_stock_count, 1);
        assert_eq!(stats.category_count, 2);
        assert_eq!(stats.categories, vec!["Books", "Games"]);
    }

    #[test]
    fn empty_inventory() {
        let stats = inventory_stats(&[], 5);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_stock_value, 0);
        assert!(stats.categories.is_empty());
    }
}
