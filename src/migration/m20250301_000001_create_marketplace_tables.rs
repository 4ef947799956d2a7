use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, CartItems, DiscountCodeUsages, DiscountCodes, OrderItems, Orders, PayoutItems,
    PayoutRequests, Products, SellerEarnings, Users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

#[sea_orm_migration::async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parents before children so foreign keys resolve on Postgres.
        create(manager, Users).await?;
        create(manager, Products).await?;
        create(manager, CartItems).await?;
        create(manager, Orders).await?;
        create(manager, OrderItems).await?;
        create(manager, DiscountCodes).await?;
        create(manager, DiscountCodeUsages).await?;
        create(manager, SellerEarnings).await?;
        create(manager, PayoutRequests).await?;
        create(manager, PayoutItems).await?;
        create(manager, AuditLogs).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AuditLogs).to_owned()).await?;
        manager.drop_table(Table::drop().table(PayoutItems).to_owned()).await?;
        manager.drop_table(Table::drop().table(PayoutRequests).to_owned()).await?;
        manager.drop_table(Table::drop().table(SellerEarnings).to_owned()).await?;
        manager.drop_table(Table::drop().table(DiscountCodeUsages).to_owned()).await?;
        manager.drop_table(Table::drop().table(DiscountCodes).to_owned()).await?;
        manager.drop_table(Table::drop().table(OrderItems).to_owned()).await?;
        manager.drop_table(Table::drop().table(Orders).to_owned()).await?;
        manager.drop_table(Table::drop().table(CartItems).to_owned()).await?;
        manager.drop_table(Table::drop().table(Products).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users).to_owned()).await?;
        Ok(())
    }
}
