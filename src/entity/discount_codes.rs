use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "discount_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// `percentage` or `fixed`.
    pub discount_type: String,
    /// Whole percent for `percentage`, minor units for `fixed`.
    pub discount_value: i64,
    pub minimum_order_amount: i64,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::discount_code_usages::Entity")]
    DiscountCodeUsages,
}

impl Related<super::discount_code_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountCodeUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
