use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "discount_code_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub discount_code_id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub used_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discount_codes::Entity",
        from = "Column::DiscountCodeId",
        to = "super::discount_codes::Column::Id",
        on_delete = "Restrict"
    )]
    DiscountCodes,
}

impl Related<super::discount_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
