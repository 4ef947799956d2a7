use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payout_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payout_request_id: Uuid,
    pub earning_id: Uuid,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payout_requests::Entity",
        from = "Column::PayoutRequestId",
        to = "super::payout_requests::Column::Id"
    )]
    PayoutRequests,
}

impl Related<super::payout_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayoutRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
