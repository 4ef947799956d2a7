use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, ProductCondition};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub condition: Option<ProductCondition>,
    pub weight: Option<i32>,
    pub dimensions: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub condition: Option<ProductCondition>,
    pub weight: Option<i32>,
    pub dimensions: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<String>)]
    pub items: Vec<String>,
}
