use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub price: i64,
    pub stock_quantity: i32,
    #[sea_orm(indexed)]
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub condition: String,
    /// Grams.
    pub weight: Option<i32>,
    pub dimensions: Option<String>,
    #[sea_orm(indexed)]
    pub owner_user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
