use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: i64,
    pub total_stock_value: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub low_stock_threshold: i32,
    pub category_count: i64,
    pub categories: Vec<String>,
}
