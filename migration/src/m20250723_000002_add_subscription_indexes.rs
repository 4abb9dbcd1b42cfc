use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // service_name での絞り込み（集計・検索）用の非ユニークインデックス
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Subscriptions::Table)
                    .name("idx_subscriptions_service_name")
                    .col(Subscriptions::ServiceName)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_subscriptions_service_name")
                    .table(Subscriptions::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    ServiceName,
}
