use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // (service_name, user_id) の複合主キーで1ユーザー1サービス1件を保証する
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscriptions::ServiceName)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Subscriptions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::Price)
                            .integer()
                            .not_null()
                            .check(Expr::col(Subscriptions::Price).gt(0)),
                    )
                    .col(ColumnDef::new(Subscriptions::StartDate).date().not_null())
                    .col(
                        ColumnDef::new(Subscriptions::EndDate).date().null(), // null = 継続中
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_subscriptions")
                            .col(Subscriptions::ServiceName)
                            .col(Subscriptions::UserId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    ServiceName,
    UserId,
    Price,
    StartDate,
    EndDate,
}
