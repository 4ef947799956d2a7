use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payout_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub seller_id: Uuid,
    pub amount: i64,
    pub status: String,
    pub payment_method: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_details: Option<String>,
    pub requested_at: DateTimeWithTimeZone,
    pub processed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payout_items::Entity")]
    PayoutItems,
}

impl Related<super::payout_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayoutItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
