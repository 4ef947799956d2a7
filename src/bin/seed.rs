use chrono::{Duration, Utc};
use marketplace_api::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::{
        discount_codes::{ActiveModel as CodeActive, Column as CodeCol, Entity as DiscountCodes},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    models::{DiscountType, ProductCondition, Role},
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let seller_id = ensure_user(&orm, "seller@example.com", "seller123", Role::Admin).await?;
    let buyer_id = ensure_user(&orm, "buyer@example.com", "buyer1234", Role::User).await?;
    seed_products(&orm, seller_id).await?;
    seed_discount_code(&orm).await?;

    if !config.is_admin_email("seller@example.com") {
        println!("Note: add seller@example.com to ADMIN_EMAILS or its role resets at next login");
    }
    println!("Seed completed. Seller ID: {seller_id}, Buyer ID: {buyer_id}");
    Ok(())
}

async fn ensure_user(orm: &OrmConn, email: &str, password: &str, role: Role) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user.id)
}

async fn seed_products(orm: &OrmConn, owner: Uuid) -> anyhow::Result<()> {
    let products = vec![
        ("Ferris Plush", "Rustacean", "Soft crab for your desk", "Toys", 1_500, 40),
        ("Mechanical Keyboard", "Clacker", "Tactile switches, UK layout", "Electronics", 8_900, 12),
        ("The Rust Book", "No Starch", "Paperback, second edition", "Books", 3_200, 25),
        ("Vintage Film Camera", "Olympus", "35mm, tested and working", "Electronics", 12_000, 2),
    ];

    for (name, brand, description, category, price, stock) in products {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        let now = Utc::now();
        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            brand: Set(Some(brand.to_string())),
            description: Set(Some(description.to_string())),
            price: Set(price),
            stock_quantity: Set(stock),
            category: Set(Some(category.to_string())),
            image_url: Set(None),
            sku: Set(None),
            condition: Set(ProductCondition::New.as_str().to_string()),
            weight: Set(None),
            dimensions: Set(None),
            owner_user_id: Set(owner),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_discount_code(orm: &OrmConn) -> anyhow::Result<()> {
    let exists = DiscountCodes::find()
        .filter(CodeCol::Code.eq("WELCOME10"))
        .one(orm)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    CodeActive {
        id: Set(Uuid::new_v4()),
        code: Set("WELCOME10".to_string()),
        description: Set(Some("10% off orders over £50".to_string())),
        discount_type: Set(DiscountType::Percentage.as_str().to_string()),
        discount_value: Set(10),
        minimum_order_amount: Set(5_000),
        max_uses: Set(Some(100)),
        current_uses: Set(0),
        expires_at: Set(Some((Utc::now() + Duration::days(90)).into())),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Seeded discount code WELCOME10");
    Ok(())
}
