use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DiscountCode, DiscountType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyDiscountRequest {
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuote {
    pub code: String,
    pub description: Option<String>,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscountCodeRequest {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub minimum_order_amount: i64,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscountCodeRequest {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub minimum_order_amount: Option<i64>,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct DiscountCodeList {
    #[schema(value_type = Vec<DiscountCode>)]
    pub items: Vec<DiscountCode>,
}
