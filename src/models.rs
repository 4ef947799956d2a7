use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items, discount_codes, order_items, orders, payout_items, payout_requests, products,
    seller_earnings, users,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Refurbished,
}

impl ProductCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCondition::New => "new",
            ProductCondition::LikeNew => "like_new",
            ProductCondition::Good => "good",
            ProductCondition::Fair => "fair",
            ProductCondition::Refurbished => "refurbished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EarningStatus {
    Available,
    PendingPayout,
    PaidOut,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningStatus::Available => "available",
            EarningStatus::PendingPayout => "pending_payout",
            EarningStatus::PaidOut => "paid_out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Completed,
    Rejected,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub condition: String,
    pub weight: Option<i32>,
    pub dimensions: Option<String>,
    pub owner_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            brand: model.brand,
            description: model.description,
            price: model.price,
            stock_quantity: model.stock_quantity,
            category: model.category,
            image_url: model.image_url,
            sku: model.sku,
            condition: model.condition,
            weight: model.weight,
            dimensions: model.dimensions,
            owner_user_id: model.owner_user_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal_amount: i64,
    pub discount_amount: i64,
    pub discount_code: Option<String>,
    pub total_amount: i64,
    pub status: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            subtotal_amount: model.subtotal_amount,
            discount_amount: model.discount_amount,
            discount_code: model.discount_code,
            total_amount: model.total_amount,
            status: model.status,
            shipping_address: model.shipping_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCode {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: i64,
    pub minimum_order_amount: i64,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<discount_codes::Model> for DiscountCode {
    fn from(model: discount_codes::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            description: model.description,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            minimum_order_amount: model.minimum_order_amount,
            max_uses: model.max_uses,
            current_uses: model.current_uses,
            expires_at: model.expires_at.map(|dt| dt.with_timezone(&Utc)),
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerEarning {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_earnings: i64,
    pub commission_rate: i32,
    pub commission_amount: i64,
    pub net_earnings: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<seller_earnings::Model> for SellerEarning {
    fn from(model: seller_earnings::Model) -> Self {
        Self {
            id: model.id,
            seller_id: model.seller_id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total_earnings: model.total_earnings,
            commission_rate: model.commission_rate,
            commission_amount: model.commission_amount,
            net_earnings: model.net_earnings,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    pub payment_details: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<payout_requests::Model> for PayoutRequest {
    fn from(model: payout_requests::Model) -> Self {
        Self {
            id: model.id,
            seller_id: model.seller_id,
            amount: model.amount,
            status: model.status,
            payment_method: model.payment_method,
            payment_details: model.payment_details,
            requested_at: model.requested_at.with_timezone(&Utc),
            processed_at: model.processed_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutItem {
    pub id: Uuid,
    pub payout_request_id: Uuid,
    pub earning_id: Uuid,
    pub amount: i64,
}

impl From<payout_items::Model> for PayoutItem {
    fn from(model: payout_items::Model) -> Self {
        Self {
            id: model.id,
            payout_request_id: model.payout_request_id,
            earning_id: model.earning_id,
            amount: model.amount,
        }
    }
}
