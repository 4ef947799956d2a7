#![allow(dead_code)]

use chrono::{DateTime, Utc};
use marketplace_api::{
    config::{AppConfig, parse_admin_emails},
    db::{create_orm_conn, run_migrations},
    entity::{
        cart_items::ActiveModel as CartActive,
        discount_codes::{ActiveModel as CodeActive, Model as CodeModel},
        products::{ActiveModel as ProductActive, Model as ProductModel},
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    models::{DiscountType, ProductCondition, Role},
};
use marketplace_api::state::AppState;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "seller@shop.test";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        admin_emails: parse_admin_emails(ADMIN_EMAIL),
        low_stock_threshold: 10,
    }
}

/// Fresh in-memory database per test, migrated like production.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:").await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, test_config()))
}

pub async fn create_user(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.as_str().into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

pub async fn create_seller(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    create_user(state, email, Role::Admin).await
}

pub async fn create_buyer(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    create_user(state, email, Role::User).await
}

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub brand: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub condition: ProductCondition,
    pub price: i64,
    pub stock: i32,
}

impl<'a> NewProduct<'a> {
    pub fn new(name: &'a str, price: i64, stock: i32) -> Self {
        Self {
            name,
            brand: None,
            description: None,
            category: None,
            condition: ProductCondition::New,
            price,
            stock,
        }
    }
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthUser,
    product: NewProduct<'_>,
) -> anyhow::Result<ProductModel> {
    let now = Utc::now();
    let model = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(product.name.to_string()),
        brand: Set(product.brand.map(str::to_string)),
        description: Set(product.description.map(str::to_string)),
        price: Set(product.price),
        stock_quantity: Set(product.stock),
        category: Set(product.category.map(str::to_string)),
        image_url: Set(None),
        sku: Set(None),
        condition: Set(product.condition.as_str().to_string()),
        weight: Set(None),
        dimensions: Set(None),
        owner_user_id: Set(owner.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(model)
}

/// Writes a cart row directly, bypassing the add-to-cart merge.
pub async fn insert_cart_row(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

pub struct NewCode<'a> {
    pub code: &'a str,
    pub discount_type: DiscountType,
    pub value: i64,
    pub minimum: i64,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl<'a> NewCode<'a> {
    pub fn percentage(code: &'a str, value: i64, minimum: i64) -> Self {
        Self {
            code,
            discount_type: DiscountType::Percentage,
            value,
            minimum,
            max_uses: None,
            current_uses: 0,
            expires_at: Some(Utc::now() + chrono::Duration::days(30)),
            is_active: true,
        }
    }
}

pub async fn create_code(state: &AppState, code: NewCode<'_>) -> anyhow::Result<CodeModel> {
    let model = CodeActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.code.to_string()),
        description: Set(None),
        discount_type: Set(code.discount_type.as_str().to_string()),
        discount_value: Set(code.value),
        minimum_order_amount: Set(code.minimum),
        max_uses: Set(code.max_uses),
        current_uses: Set(code.current_uses),
        expires_at: Set(code.expires_at.map(Into::into)),
        is_active: Set(code.is_active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(model)
}

pub fn bad_request_message(err: &marketplace_api::error::AppError) -> Option<&str> {
    match err {
        marketplace_api::error::AppError::BadRequest(msg) => Some(msg.as_str()),
        _ => None,
    }
}
