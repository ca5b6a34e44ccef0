use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::infra::storage::entity::{
    agent, audit_log, branch, client, contract, insurance_case, insurance_type, user,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_with_indexes<E>(manager: &SchemaManager<'_>, schema: &Schema) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(
            schema
                .create_table_from_entity(E::default())
                .if_not_exists()
                .to_owned(),
        )
        .await?;
    for mut index in schema.create_index_from_entity(E::default()) {
        manager.create_index(index.if_not_exists().to_owned()).await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Referenced tables first.
        create_with_indexes::<branch::Entity>(manager, &schema).await?;
        create_with_indexes::<agent::Entity>(manager, &schema).await?;
        create_with_indexes::<user::Entity>(manager, &schema).await?;
        create_with_indexes::<client::Entity>(manager, &schema).await?;
        create_with_indexes::<insurance_type::Entity>(manager, &schema).await?;
        create_with_indexes::<contract::Entity>(manager, &schema).await?;
        create_with_indexes::<insurance_case::Entity>(manager, &schema).await?;
        create_with_indexes::<audit_log::Entity>(manager, &schema).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(audit_log::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(insurance_case::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(contract::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(insurance_type::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(client::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(agent::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(branch::Entity).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
